//! Identifier casing and literal escaping used by the naming deriver and templates.

use convert_case::{Case, Casing};

/// Convert a string to kebab-case
pub fn to_kebab_case(s: &str) -> String {
    s.to_case(Case::Kebab)
}

/// Convert a string to PascalCase
pub fn to_pascal_case(s: &str) -> String {
    s.to_case(Case::Pascal)
}

/// Convert a string to snake_case
pub fn to_snake_case(s: &str) -> String {
    s.to_case(Case::Snake)
}

/// Convert a string to camelCase
pub fn to_camel_case(s: &str) -> String {
    s.to_case(Case::Camel)
}

/// Convert a string to space separated Title Case
pub fn to_title_case(s: &str) -> String {
    s.to_case(Case::Title)
}

/// Escape a string for use inside a single-quoted TypeScript literal
pub fn escape_single_quoted(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}
