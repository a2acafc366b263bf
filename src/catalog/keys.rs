//! Primary keys, unique indexes and foreign keys of one table.
use serde_json::{Map, Value};

use crate::config::TableNaming;
use crate::graph::{CLASS_FIELD, IdIndex, bool_field, entries, id_of, str_field};
use crate::ir::{ColumnPair, ForeignKey, IndexBlock, IndexKind};

use super::table_display_name;

#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryKey<'a> {
    pub id: Option<&'a str>,
    pub columns: Vec<String>,
}

impl PrimaryKey<'_> {
    /// The key column when the key is single-column (rendered as a column attribute).
    pub fn single_column(&self) -> Option<&str> {
        match self.columns.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        self.columns.len() >= 2
    }

    fn same_columns(&self, other: &[String]) -> bool {
        sorted(&self.columns) == sorted(other)
    }
}

fn sorted(xs: &[String]) -> Vec<&str> {
    let mut v: Vec<&str> = xs.iter().map(String::as_str).collect();
    v.sort_unstable();
    v
}

/// Names of the columns behind a list of column references; dangling ones are dropped.
pub fn column_names<'a>(refs: &'a [Value], index: &IdIndex<'a>) -> Vec<String> {
    refs.iter()
        .filter_map(|r| index.resolve(r))
        .filter_map(|c| str_field(c, "name"))
        .map(str::to_string)
        .collect()
}

fn column_name<'a>(node: Option<&'a Value>, index: &IdIndex<'a>) -> Option<&'a str> {
    node.and_then(|n| index.resolve(n))
        .and_then(|c| str_field(c, "name"))
}

// ————————————————————————————————————————————————————————————————————————————
// PRIMARY KEY
// ————————————————————————————————————————————————————————————————————————————

/// Missing reference, dangling reference and empty column list all mean "no key".
pub fn primary_key<'a>(
    table: &'a Map<String, Value>,
    table_name: &str,
    index: &IdIndex<'a>,
) -> Option<PrimaryKey<'a>> {
    let node = table.get("primary-key").filter(|v| !v.is_null())?;
    let Some(pk) = index.resolve(node) else {
        tracing::warn!(table = table_name, "primary key reference does not resolve; treating table as keyless");
        return None;
    };
    let columns = column_names(entries(pk.get("columns")), index);
    if columns.is_empty() {
        tracing::warn!(table = table_name, "primary key has no resolvable columns; treating table as keyless");
        return None;
    }
    Some(PrimaryKey { id: id_of(pk), columns })
}

// ————————————————————————————————————————————————————————————————————————————
// INDEXES
// ————————————————————————————————————————————————————————————————————————————

fn is_index(obj: &Map<String, Value>) -> bool {
    match str_field(obj, CLASS_FIELD) {
        Some(class) => class.ends_with("Index"),
        None => true,
    }
}

/// `indexes { ... }` entries: the composite primary key first, then unique indexes
/// that the primary key does not already cover. Non-unique indexes are dropped.
pub fn index_blocks<'a>(
    table: &'a Map<String, Value>,
    pk: Option<&PrimaryKey<'a>>,
    index: &IdIndex<'a>,
) -> Vec<IndexBlock> {
    let mut blocks = Vec::new();

    if let Some(pk) = pk.filter(|pk| pk.is_composite()) {
        blocks.push(IndexBlock { kind: IndexKind::PrimaryKey, columns: pk.columns.clone() });
    }

    for entry in entries(table.get("table-constraints")) {
        let Some(idx) = index.resolve(entry) else { continue };
        if !is_index(idx) || !bool_field(idx, "unique").unwrap_or(false) {
            continue;
        }
        if let Some(pk) = pk {
            if pk.id.is_some() && id_of(idx) == pk.id {
                continue;
            }
        }
        let columns = column_names(entries(idx.get("columns")), index);
        if columns.is_empty() {
            continue;
        }
        if pk.is_some_and(|pk| pk.same_columns(&columns)) {
            continue;
        }
        if blocks.iter().any(|b| b.kind == IndexKind::Unique && b.columns == columns) {
            continue;
        }
        blocks.push(IndexBlock { kind: IndexKind::Unique, columns });
    }

    blocks
}

// ————————————————————————————————————————————————————————————————————————————
// FOREIGN KEYS
// ————————————————————————————————————————————————————————————————————————————

/// Rule name out of a `[class, rule]` pair (or a bare string).
pub fn rule_name(node: Option<&Value>) -> Option<String> {
    let name = match node? {
        Value::Array(xs) if xs.len() >= 2 => xs[1].as_str()?,
        Value::String(s) => s.as_str(),
        _ => return None,
    };
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// True when `column` is one of the table's own resolved columns.
fn owns_column(own: &[&Map<String, Value>], column: &Map<String, Value>) -> bool {
    own.iter().any(|c| {
        std::ptr::eq(*c, column) || matches!((id_of(c), id_of(column)), (Some(a), Some(b)) if a == b)
    })
}

/// Foreign keys whose referencing side is this table.
///
/// The exporter lists a key under both ends of the relationship; pairs whose
/// `foreign-key-column` is not one of this table's columns belong to the other
/// table and are skipped here.
pub fn foreign_keys<'a>(
    table: &'a Map<String, Value>,
    table_name: &str,
    naming: TableNaming,
    index: &IdIndex<'a>,
) -> Vec<ForeignKey> {
    let own_columns: Vec<&Map<String, Value>> = entries(table.get("columns"))
        .iter()
        .filter_map(|r| index.resolve(r))
        .collect();
    let mut out = Vec::new();

    for entry in entries(table.get("foreign-keys")) {
        let Some(fk) = index.resolve(entry) else {
            tracing::warn!(table = table_name, "foreign key reference does not resolve; skipped");
            continue;
        };
        let fk_name = str_field(fk, "name").unwrap_or("?");

        let ref_obj = fk.get("referenced-table").and_then(|n| index.resolve(n));
        let Some(ref_table) = ref_obj.and_then(|t| table_display_name(t, naming)) else {
            tracing::warn!(table = table_name, foreign_key = fk_name, "referenced table does not resolve; skipped");
            continue;
        };

        let mut pairs = Vec::new();
        for cr in entries(fk.get("column-references")) {
            let Some(cr) = index.resolve(cr) else { continue };
            let local_column = cr.get("foreign-key-column").and_then(|n| index.resolve(n));
            if local_column.is_some_and(|c| !owns_column(&own_columns, c)) {
                continue;
            }
            let local = local_column.and_then(|c| str_field(c, "name"));
            let referenced = column_name(cr.get("primary-key-column"), index);
            match (local, referenced) {
                (Some(local), Some(referenced)) => pairs.push(ColumnPair {
                    local: local.to_string(),
                    referenced: referenced.to_string(),
                }),
                _ => tracing::warn!(
                    table = table_name,
                    foreign_key = fk_name,
                    "column reference with an unresolved side; skipped"
                ),
            }
        }
        if pairs.is_empty() {
            continue;
        }

        let same_table = match (id_of(table), ref_obj.and_then(id_of)) {
            (Some(a), Some(b)) => a == b,
            _ => ref_table == table_name,
        };
        if same_table && pairs.iter().all(|p| p.local == p.referenced) {
            tracing::debug!(table = table_name, foreign_key = fk_name, "suppressing self-identity foreign key");
            continue;
        }

        out.push(ForeignKey {
            ref_table: ref_table.to_string(),
            pairs,
            delete_rule: rule_name(fk.get("delete-rule")),
            update_rule: rule_name(fk.get("update-rule")),
        });
    }

    out
}
