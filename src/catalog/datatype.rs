use serde_json::{Map, Value};

use crate::graph::{IdIndex, str_field};

/// Used whenever a column's type cannot be resolved.
pub const FALLBACK_TYPE: &str = "varchar";

/// Name fields on a data-type object, highest priority first.
const TYPE_NAME_FIELDS: [&str; 5] = [
    "database-specific-type-name",
    "local-type-name",
    "standard-type-name",
    "name",
    "full-name",
];

/// Column fields that may carry the data-type reference.
const TYPE_REF_FIELDS: [&str; 2] = ["column-data-type", "type"];

/// Display name of a data-type reference (inline object or `@uuid`).
///
/// `None` when the reference is missing, dangling, or names nothing.
pub fn type_name<'a>(dtref: Option<&'a Value>, index: &IdIndex<'a>) -> Option<&'a str> {
    let dt = index.resolve(dtref?)?;
    TYPE_NAME_FIELDS.iter().find_map(|key| str_field(dt, key))
}

/// Parenthesized width suffix for a column, e.g. `(255)`.
///
/// A string `width` is authoritative when present (the exporter writes `""`
/// for types without one); a positive integer `size` is used only otherwise.
pub fn width_suffix(column: &Map<String, Value>) -> Option<String> {
    match column.get("width") {
        Some(Value::String(w)) => {
            let w = w.trim();
            w.starts_with('(').then(|| w.to_string())
        }
        _ => column
            .get("size")
            .and_then(Value::as_i64)
            .filter(|size| *size > 0)
            .map(|size| format!("({size})")),
    }
}

/// Storage type of a column as it should appear in a column line.
pub fn resolve_column_type<'a>(column: &'a Map<String, Value>, index: &IdIndex<'a>) -> String {
    let dtref = TYPE_REF_FIELDS.iter().find_map(|key| column.get(*key).filter(|v| !v.is_null()));
    let base = match type_name(dtref, index) {
        Some(name) => name.trim(),
        None => {
            tracing::debug!(
                column = str_field(column, "name").unwrap_or("?"),
                "unresolved data type, using {FALLBACK_TYPE}"
            );
            FALLBACK_TYPE
        }
    };
    match width_suffix(column) {
        // some dialect names already carry their width, e.g. `bit(1)`
        Some(suffix) if !base.ends_with(')') => format!("{base}{suffix}"),
        _ => base.to_string(),
    }
}
