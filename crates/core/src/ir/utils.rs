//! Identifier helpers shared across the compiler.
//!
//! Generated code follows Go naming: exported names are CamelCase with common
//! initialisms fully upper-cased (`server_http_endpoint` -> `ServerHTTPEndpoint`),
//! argument names are lowerCamelCase.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Go keywords that cannot be used as identifiers.
pub static GO_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "break",
        "case",
        "chan",
        "const",
        "continue",
        "default",
        "defer",
        "else",
        "fallthrough",
        "for",
        "func",
        "go",
        "goto",
        "if",
        "import",
        "interface",
        "map",
        "package",
        "range",
        "return",
        "select",
        "struct",
        "switch",
        "type",
        "var",
    ]
    .into_iter()
    .collect()
});

/// Builtin type names that must never be re-cased.
pub static GO_BUILTIN_TYPES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "any", "bool", "byte", "error", "float32", "float64", "int", "int8", "int16", "int32",
        "int64", "rune", "string", "uint", "uint8", "uint16", "uint32", "uint64",
    ]
    .into_iter()
    .collect()
});

/// Words that are written fully upper-case in identifiers.
pub static COMMON_INITIALISMS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GID", "GUID", "HTML", "HTTP", "HTTPS",
        "ID", "IP", "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP",
        "TLS", "TTL", "UDP", "UI", "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML", "XMPP",
        "XSRF", "XSS",
    ]
    .into_iter()
    .collect()
});

/// Split an identifier into words on separators and case boundaries.
///
/// `HTTPServer` splits as `HTTP`, `Server`; digits stay with the word before them.
pub fn split_words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '_' | '-' | '.' | ' ' | '/' | '{' | '}') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_ascii_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn export_word(word: &str) -> String {
    let upper = word.to_ascii_uppercase();
    if COMMON_INITIALISMS.contains(upper.as_str()) {
        return upper;
    }
    capitalize_first(word)
}

/// Convert a name to an exported (CamelCase) identifier.
pub fn type_name(s: &str) -> String {
    if GO_BUILTIN_TYPES.contains(s) {
        return s.to_string();
    }

    let result: String = split_words(s).iter().map(|w| export_word(w)).collect();
    if result.is_empty() {
        return "_".to_string();
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("_{result}");
    }
    result
}

/// Convert a name to an unexported (lowerCamelCase) identifier safe to use as
/// a variable or argument name.
pub fn arg_name(s: &str) -> String {
    let words = split_words(s);
    let Some((first, rest)) = words.split_first() else {
        return "_".to_string();
    };

    let mut result = if COMMON_INITIALISMS.contains(first.to_ascii_uppercase().as_str()) {
        first.to_ascii_lowercase()
    } else {
        lower_first(first)
    };
    result.extend(rest.iter().map(|w| export_word(w)));

    if result.starts_with(|c: char| c.is_ascii_digit())
        || GO_RESERVED_WORDS.contains(result.as_str())
    {
        result = format!("_{result}");
    }
    result
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Ordering of model fields: `ID` first, timestamps last, everything else
/// lexically in between.
pub fn field_order(a: &str, b: &str) -> Ordering {
    fn rank(name: &str) -> u8 {
        match name {
            "ID" => 0,
            "CreatedAt" => 2,
            "UpdatedAt" => 3,
            _ => 1,
        }
    }

    rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
}

/// Quote a string as a Go string literal.
pub fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
