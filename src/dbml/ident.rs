use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::IdentQuote;

static PLAIN_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

pub fn is_plain(name: &str) -> bool {
    PLAIN_IDENT.is_match(name)
}

/// Table or column name as a DBML token; quoted unless it is a plain identifier.
pub fn ident(name: &str, quote: IdentQuote) -> Cow<'_, str> {
    if is_plain(name) {
        return Cow::Borrowed(name);
    }
    match quote {
        IdentQuote::Double => Cow::Owned(format!("\"{}\"", name.replace('"', "\\\""))),
        IdentQuote::Backtick => Cow::Owned(format!("`{name}`")),
    }
}

/// Column type token. Multi-word types (`timestamp with time zone`) must be quoted.
pub fn type_token(ty: &str) -> Cow<'_, str> {
    if ty.chars().any(char::is_whitespace) {
        Cow::Owned(format!("\"{}\"", ty.replace('"', "\\\"")))
    } else {
        Cow::Borrowed(ty)
    }
}
