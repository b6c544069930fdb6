//! Keyword tables by file extension.
//!
//! An extension that appears here is also on the highlighting allow-list.

const JAVA: &[&str] = &[
    "public", "private", "protected", "class", "interface", "extends", "implements", "void", "int",
    "String", "boolean", "double", "float", "long", "short", "byte", "char", "if", "else", "for",
    "while", "do", "switch", "case", "break", "continue", "return", "new", "this", "super",
    "static", "final", "abstract", "synchronized", "volatile", "try", "catch", "throw", "throws",
    "finally", "import", "package", "enum", "null", "true", "false",
];

const JAVASCRIPT: &[&str] = &[
    "function", "const", "let", "var", "if", "else", "for", "while", "do", "switch", "case",
    "break", "continue", "return", "class", "extends", "implements", "interface", "import",
    "export", "default", "async", "await", "try", "catch", "throw", "finally", "new", "this",
    "typeof", "instanceof", "null", "undefined", "true", "false",
];

const PYTHON: &[&str] = &[
    "def", "class", "if", "elif", "else", "for", "while", "return", "import", "from", "as", "try",
    "except", "finally", "with", "lambda", "yield", "async", "await", "pass", "break", "continue",
    "raise", "assert", "del", "global", "nonlocal", "True", "False", "None", "and", "or", "not",
    "in", "is",
];

const MARKUP: &[&str] = &[
    "div", "span", "html", "head", "body", "script", "style", "link", "meta", "title", "h1", "h2",
    "h3", "h4", "h5", "h6", "p", "a", "img", "button", "input", "form", "table", "tr", "td", "th",
    "ul", "ol", "li", "nav", "header", "footer", "section", "article",
];

const STYLESHEET: &[&str] = &[
    "color", "background", "margin", "padding", "border", "width", "height", "display", "flex",
    "grid", "position", "top", "left", "right", "bottom", "font", "text", "align", "justify",
    "transform", "transition", "animation",
];

const C_FAMILY: &[&str] = &[
    "int", "char", "float", "double", "void", "long", "short", "unsigned", "signed", "if", "else",
    "for", "while", "do", "switch", "case", "break", "continue", "return", "struct", "union",
    "enum", "typedef", "sizeof", "const", "static", "extern", "include", "define", "ifdef",
    "ifndef", "endif", "NULL", "true", "false",
];

const GO: &[&str] = &[
    "func", "var", "const", "type", "struct", "interface", "package", "import", "if", "else",
    "for", "switch", "case", "break", "continue", "return", "defer", "go", "chan", "select",
    "range", "map", "make", "new", "nil", "true", "false",
];

const RUST: &[&str] = &[
    "fn", "let", "mut", "const", "static", "struct", "enum", "trait", "impl", "if", "else", "for",
    "while", "loop", "match", "break", "continue", "return", "pub", "use", "mod", "crate", "self",
    "super", "true", "false", "None", "Some",
];

const PHP: &[&str] = &[
    "function", "class", "interface", "trait", "extends", "implements", "public", "private",
    "protected", "static", "final", "abstract", "if", "else", "elseif", "for", "foreach", "while",
    "do", "switch", "case", "break", "continue", "return", "try", "catch", "throw", "finally",
    "new", "this", "self", "parent", "true", "false", "null", "echo", "print", "var", "const",
];

const RUBY: &[&str] = &[
    "def", "class", "module", "if", "elsif", "else", "unless", "case", "when", "for", "while",
    "until", "break", "next", "return", "yield", "begin", "rescue", "ensure", "end", "true",
    "false", "nil", "self", "super", "require", "include", "attr_accessor",
];

const SWIFT: &[&str] = &[
    "func", "var", "let", "class", "struct", "enum", "protocol", "extension", "if", "else",
    "guard", "switch", "case", "for", "while", "repeat", "break", "continue", "return", "import",
    "public", "private", "internal", "static", "final", "override", "true", "false", "nil",
    "self", "super", "try", "catch", "throw",
];

const KOTLIN: &[&str] = &[
    "fun", "val", "var", "class", "interface", "object", "companion", "if", "else", "when", "for",
    "while", "do", "break", "continue", "return", "public", "private", "protected", "internal",
    "open", "abstract", "final", "override", "true", "false", "null", "this", "super", "import",
    "package",
];

/// Keywords for a lowercase extension, or `None` when the extension is not
/// highlighted at all.
pub fn keywords_for(extension: &str) -> Option<&'static [&'static str]> {
    let table = match extension {
        "java" => JAVA,
        "js" | "jsx" | "ts" | "tsx" => JAVASCRIPT,
        "py" => PYTHON,
        "html" | "xml" => MARKUP,
        "css" | "scss" | "sass" => STYLESHEET,
        "c" | "cpp" | "h" | "hpp" => C_FAMILY,
        "go" => GO,
        "rs" => RUST,
        "php" => PHP,
        "rb" => RUBY,
        "swift" => SWIFT,
        "kt" => KOTLIN,
        _ => return None,
    };
    Some(table)
}
