//! Catalog walker: raw export tree + identifier index → normalized [`crate::ir::Schema`].
//!
//! Every lookup here is best-effort. A reference that does not resolve drops the
//! element it belongs to (a column, an index, a foreign-key pair) and logs it;
//! it never fails the conversion.
pub mod datatype;
pub mod keys;

use serde_json::{Map, Value};

use crate::config::{ConvertOptions, TableNaming};
use crate::graph::{IdIndex, bool_field, entries, str_field};
use crate::ir::{Column, Schema, Table};

use keys::PrimaryKey;

// ————————————————————————————————————————————————————————————————————————————
// ENTRY POINT
// ————————————————————————————————————————————————————————————————————————————

/// Walk `catalog.tables` in source order. The index must already cover `root`.
pub fn walk_catalog<'a>(root: &'a Value, index: &IdIndex<'a>, options: &ConvertOptions) -> Schema {
    let table_list = root.get("catalog").and_then(|c| c.get("tables"));
    let tables = entries(table_list)
        .iter()
        .enumerate()
        .filter_map(|(position, entry)| {
            let table = walk_table(entry, index, options);
            if table.is_none() {
                tracing::warn!(position, "table entry does not resolve to a named table; skipped");
            }
            table
        })
        .collect();
    Schema { tables }
}

fn walk_table<'a>(entry: &'a Value, index: &IdIndex<'a>, options: &ConvertOptions) -> Option<Table> {
    let table = index.resolve(entry)?;
    let name = table_display_name(table, options.table_names)?;

    let pk = keys::primary_key(table, name, index);
    let columns = table_columns(table, name, pk.as_ref(), index);
    let indexes = keys::index_blocks(table, pk.as_ref(), index);
    let foreign_keys = keys::foreign_keys(table, name, options.table_names, index);

    tracing::debug!(
        table = name,
        columns = columns.len(),
        indexes = indexes.len(),
        foreign_keys = foreign_keys.len(),
        "resolved table"
    );

    Some(Table {
        name: name.to_string(),
        note: remark(table),
        columns,
        indexes,
        foreign_keys,
    })
}

// ————————————————————————————————————————————————————————————————————————————
// COLUMNS
// ————————————————————————————————————————————————————————————————————————————

fn table_columns<'a>(
    table: &'a Map<String, Value>,
    table_name: &str,
    pk: Option<&PrimaryKey<'a>>,
    index: &IdIndex<'a>,
) -> Vec<Column> {
    let single_pk = pk.and_then(PrimaryKey::single_column);
    let pk_columns: &[String] = pk.map(|pk| pk.columns.as_slice()).unwrap_or_default();

    let mut columns: Vec<Column> = entries(table.get("columns"))
        .iter()
        .filter_map(|r| index.resolve(r))
        .filter_map(|c| {
            let column = build_column(c, single_pk, pk_columns, index);
            if column.is_none() {
                tracing::warn!(table = table_name, "column without a name; skipped");
            }
            column
        })
        .collect();

    // stable: ties keep source order
    columns.sort_by_key(|c| c.ordinal);
    columns
}

/// `pk` is set only for a single-column key; every key column drops `unique`,
/// since the exporter flags all of them as part of the key's unique index.
fn build_column<'a>(
    c: &'a Map<String, Value>,
    single_pk: Option<&str>,
    pk_columns: &[String],
    index: &IdIndex<'a>,
) -> Option<Column> {
    let name = str_field(c, "name")?;
    let pk = single_pk == Some(name);
    let in_key = pk_columns.iter().any(|k| k == name);
    Some(Column {
        name: name.to_string(),
        ordinal: c.get("ordinal-position").and_then(Value::as_i64).unwrap_or(0),
        ty: datatype::resolve_column_type(c, index),
        pk,
        not_null: !bool_field(c, "nullable").unwrap_or(true),
        unique: bool_field(c, "part-of-unique-index").unwrap_or(false) && !in_key,
        increment: bool_field(c, "auto-incremented").unwrap_or(false),
        default: default_value(c),
        note: remark(c),
    })
}

fn default_value(c: &Map<String, Value>) -> Option<String> {
    let raw = match c.get("default-value")? {
        Value::String(s) => s.trim().to_string(),
        Value::Null => return None,
        other => other.to_string(),
    };
    (!raw.is_empty()).then_some(raw)
}

// ————————————————————————————————————————————————————————————————————————————
// SHARED
// ————————————————————————————————————————————————————————————————————————————

pub(crate) fn table_display_name(table: &Map<String, Value>, naming: TableNaming) -> Option<&str> {
    let (first, second) = match naming {
        TableNaming::Name => ("name", "full-name"),
        TableNaming::FullName => ("full-name", "name"),
    };
    str_field(table, first)
        .or_else(|| str_field(table, second))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn remark(obj: &Map<String, Value>) -> Option<String> {
    str_field(obj, "remarks")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
