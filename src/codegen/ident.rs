//! TypeScript identifier handling.
//!
//! ABI names are arbitrary strings. Generated declarations need valid,
//! non-reserved identifiers, while wire names must pass through untouched.

use heck::ToLowerCamelCase;

/// Words that cannot be used as a binding identifier in TypeScript modules.
const RESERVED: &[&str] = &[
    "any", "arguments", "as", "await", "boolean", "break", "case", "catch", "class", "const",
    "constructor", "continue", "debugger", "declare", "default", "delete", "do", "else", "enum",
    "eval", "export", "extends", "false", "finally", "for", "function", "if", "implements",
    "import", "in", "instanceof", "interface", "let", "never", "new", "null", "number", "object",
    "package", "private", "protected", "public", "return", "static", "string", "super", "switch",
    "symbol", "this", "throw", "true", "try", "type", "typeof", "undefined", "unknown", "var",
    "void", "while", "with", "yield",
];

/// Check whether `name` is a plain identifier (`[A-Za-z_$][A-Za-z0-9_$]*`).
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Turn an arbitrary ABI name into a usable identifier.
///
/// Invalid characters become `_`, a leading digit gets a `_` prefix and
/// reserved words get a `_` suffix.
pub fn safe_ident(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if is_reserved(&ident) {
        ident.push('_');
    }
    ident
}

/// Binding name for a method in the positional client: `make_person` → `makePerson`.
pub fn method_ident(name: &str) -> String {
    let camel = name.to_lower_camel_case();
    if camel.is_empty() {
        safe_ident(name)
    } else {
        safe_ident(&camel)
    }
}

/// Property key for an object type member.
///
/// Keys are wire names, so they are never rewritten; names that are not plain
/// identifiers are emitted as string literals instead.
pub fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        string_literal(name)
    }
}

/// Property access on `target`: `target.name` or `target["na-me"]`.
pub fn property_access(target: &str, name: &str) -> String {
    if is_identifier(name) {
        format!("{target}.{name}")
    } else {
        format!("{target}[{}]", string_literal(name))
    }
}

/// A double-quoted TypeScript string literal.
pub fn string_literal(value: &str) -> String {
    // JSON string escaping is valid TypeScript string syntax.
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_ident_cases() {
        assert_eq!(safe_ident("Person"), "Person");
        assert_eq!(safe_ident("default"), "default_");
        assert_eq!(safe_ident("2fa"), "_2fa");
        assert_eq!(safe_ident("content-type"), "content_type");
        assert_eq!(safe_ident(""), "_");
    }

    #[test]
    fn method_ident_camel_cases() {
        assert_eq!(method_ident("make_person"), "makePerson");
        assert_eq!(method_ident("get"), "get");
        assert_eq!(method_ident("delete"), "delete_");
    }

    #[test]
    fn property_keys_keep_wire_names() {
        assert_eq!(property_key("email"), "email");
        assert_eq!(property_key("class"), "class");
        assert_eq!(property_key("content-type"), "\"content-type\"");
        assert_eq!(property_access("params", "age"), "params.age");
        assert_eq!(property_access("params", "x-y"), "params[\"x-y\"]");
    }

    #[test]
    fn string_literal_escapes() {
        assert_eq!(string_literal("a\"b"), "\"a\\\"b\"");
    }
}
