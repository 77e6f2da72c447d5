//! Name utilities
//!
//! Prefix handling for qualified XSD names and the case conversions used
//! to turn schema names into class and field names.

use once_cell::sync::Lazy;
use regex::Regex;

static ACRONYM_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z\d]+)([A-Z][a-z])").expect("valid regex"));

static WORD_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("valid regex"));

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-.\s]+").expect("valid regex"));

/// Rust keywords that cannot be used as bare field names
const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "false",
    "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where", "while",
    "abstract", "become", "box", "do", "final", "macro", "override", "priv", "typeof", "unsized",
    "virtual", "yield", "try",
];

/// Path keywords that cannot be raw identifiers either
const PATH_KEYWORDS: &[&str] = &["crate", "self", "super"];

/// Split a QName into prefix and local name
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = qname.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, qname)
    }
}

/// Local part of a possibly prefixed name
pub fn local_name(qname: &str) -> &str {
    split_qname(qname).1
}

/// Convert a schema name into a class name (`book-entry` -> `BookEntry`)
pub fn camelize(name: &str) -> String {
    local_name(name)
        .split(|c: char| c == '_' || c == '-' || c == '.' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Convert a schema or class name into snake case (`HTTPServer` -> `http_server`)
pub fn underscore(name: &str) -> String {
    let name = local_name(name);
    let name = ACRONYM_BOUNDARY.replace_all(name, "${1}_${2}");
    let name = WORD_BOUNDARY.replace_all(&name, "${1}_${2}");
    let name = SEPARATORS.replace_all(&name, "_");
    name.to_lowercase()
}

/// Snake-case field name, escaped when it collides with a keyword
pub fn field_name(name: &str) -> String {
    let field = underscore(name);
    if PATH_KEYWORDS.contains(&field.as_str()) {
        format!("{}_", field)
    } else if KEYWORDS.contains(&field.as_str()) {
        format!("r#{}", field)
    } else {
        field
    }
}
