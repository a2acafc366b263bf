//! Escaping of notes and default expressions for the DBML grammar.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::DefaultStyle;

/// Prefixes of volatile SQL functions that must never be emitted bare.
static VOLATILE_FN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(nextval|uuid_|now|current_|gen_random_uuid)").expect("valid default regex")
});

fn fold_newlines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// `'...'` literal for `note:` / `Note:`; single quotes are doubled.
pub fn note(text: &str) -> String {
    format!("'{}'", fold_newlines(text).replace('\'', "''"))
}

/// The value after `default: `, or `None` when nothing should be emitted.
pub fn default_value(expr: &str, style: DefaultStyle) -> Option<String> {
    let expr = fold_newlines(expr.trim());
    if expr.is_empty() {
        return None;
    }
    match style {
        DefaultStyle::Raw => Some(format!("`{expr}`")),
        DefaultStyle::Sql => sql_default(&expr),
    }
}

fn sql_default(expr: &str) -> Option<String> {
    if expr.eq_ignore_ascii_case("null") {
        return None;
    }
    let sql_looking = expr.contains(['(', ')']) || expr.contains("::") || VOLATILE_FN.is_match(expr);
    let needs_quotes = expr.contains([' ', ':', '\'', '"']);
    if sql_looking || needs_quotes {
        Some(format!("\"{}\"", expr.replace('"', "\\\"")))
    } else {
        Some(expr.to_string())
    }
}
