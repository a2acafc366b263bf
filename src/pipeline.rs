//! raw export → index → catalog walk → DBML text, plus the file-level wrapper.
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::ConvertOptions;
use crate::error::{ConvertError, ShapeError};
use crate::graph::IdIndex;

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub dbml: String,
    pub tables: usize,
    pub refs: usize,
}

/// Convert an already-parsed export document.
pub fn convert_value(root: &Value, options: &ConvertOptions) -> Result<Conversion, ShapeError> {
    crate::path_de::check_header(root)?;

    // the index must be complete before any resolution: foreign keys point forward
    let index = IdIndex::build(root);
    tracing::debug!(identifiers = index.len(), "built identifier index");

    let schema = crate::catalog::walk_catalog(root, &index, options);
    let dbml = crate::dbml::render(&schema, options);
    Ok(Conversion {
        tables: schema.tables.len(),
        refs: schema.ref_count(),
        dbml,
    })
}

/// Parse and convert export text; `origin` only labels errors.
pub fn convert_str(source: &str, origin: &Path, options: &ConvertOptions) -> Result<Conversion, ConvertError> {
    let root = serde_json::from_str::<Value>(source).map_err(|source| ConvertError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;
    convert_value(&root, options).map_err(|source| ConvertError::Shape {
        path: origin.to_path_buf(),
        source,
    })
}

/// Read, convert and write one file. `output == None` prints to stdout.
pub fn convert_file(
    input: &Path,
    output: Option<&Path>,
    options: &ConvertOptions,
) -> Result<Conversion, ConvertError> {
    tracing::info!(input = %input.display(), "converting");
    let source = std::fs::read_to_string(input).map_err(|source| ConvertError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let conversion = convert_str(&source, input, options)?;
    match output {
        Some(out) => write_atomic(out, &conversion.dbml)?,
        None => print!("{}", conversion.dbml),
    }
    tracing::info!(
        input = %input.display(),
        tables = conversion.tables,
        refs = conversion.refs,
        "converted"
    );
    Ok(conversion)
}

/// Write to a sibling temp file, then rename over the target.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), ConvertError> {
    let write_err = |source| ConvertError::Write { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let temp_path = temp_sibling(path);
    if let Err(source) = std::fs::write(&temp_path, contents) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(write_err(source));
    }
    std::fs::rename(&temp_path, path).map_err(|source| {
        let _ = std::fs::remove_file(&temp_path);
        write_err(source)
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scenario_doc() -> Value {
        json!({
            "catalog": {
                "tables": ["java.util.ArrayList", [
                    {
                        "@uuid": "t-users", "name": "public.users",
                        "columns": ["java.util.ArrayList", ["c-email", "c-id"]],
                        "primary-key": "pk-users",
                        "table-constraints": ["java.util.ArrayList", [
                            { "@uuid": "pk-users", "@class": "schemacrawler.crawl.MutablePrimaryKey",
                              "columns": ["java.util.ArrayList", ["c-id"]] },
                            { "@uuid": "ix-email", "@class": "schemacrawler.crawl.MutableIndex",
                              "unique": true, "columns": ["java.util.ArrayList", ["c-email"]] }
                        ]]
                    },
                    {
                        "@uuid": "t-orders", "name": "orders",
                        "columns": ["java.util.ArrayList", ["c-oid", "c-user"]],
                        "foreign-keys": ["java.util.ArrayList", [
                            {
                                "@uuid": "fk-orders-user",
                                "referenced-table": "t-users-short",
                                "column-references": ["java.util.ArrayList", [
                                    { "foreign-key-column": "c-user", "primary-key-column": "c-id" }
                                ]],
                                "delete-rule": ["schemacrawler.schema.ForeignKeyUpdateRule", "cascade"]
                            }
                        ]]
                    }
                ]],
                "schemas": [{ "@uuid": "t-users-short", "name": "users" }]
            },
            "all-table-columns": ["java.util.ArrayList", [
                { "@uuid": "c-id", "name": "id", "ordinal-position": 1, "nullable": false,
                  "auto-incremented": true, "column-data-type": { "database-specific-type-name": "integer" } },
                { "@uuid": "c-email", "name": "email", "ordinal-position": 2, "nullable": true,
                  "part-of-unique-index": true, "size": 255,
                  "column-data-type": { "database-specific-type-name": "varchar" } },
                { "@uuid": "c-oid", "name": "id", "ordinal-position": 1, "nullable": false,
                  "column-data-type": "dt-missing" },
                { "@uuid": "c-user", "name": "user_id", "ordinal-position": 2,
                  "column-data-type": "dt-int" }
            ]],
            "column-data-types": [{ "@uuid": "dt-int", "local-type-name": "int4" }]
        })
    }

    #[test]
    fn users_and_orders_scenario() {
        let conversion = convert_value(&scenario_doc(), &ConvertOptions::default()).unwrap();
        assert_eq!(conversion.tables, 2);
        assert_eq!(conversion.refs, 1);
        let out = conversion.dbml;
        assert!(out.contains(
            "Table \"public.users\" {\n  id integer [pk, not null, increment]\n  email varchar(255) [unique]\n"
        ), "{out}");
        assert!(out.contains("  indexes {\n    (email) [unique]\n  }\n"), "{out}");
        assert!(out.contains("Table orders {\n  id varchar [not null]\n  user_id int4\n}\n"), "{out}");
        assert!(out.ends_with("Ref: users.id > orders.user_id [delete: cascade]\n"), "{out}");
    }

    #[test]
    fn conversion_is_deterministic() {
        let doc = scenario_doc();
        let a = convert_value(&doc, &ConvertOptions::default()).unwrap();
        let b = convert_value(&doc, &ConvertOptions::default()).unwrap();
        assert_eq!(a.dbml, b.dbml);
    }

    #[test]
    fn missing_table_list_is_a_shape_error() {
        let err = convert_str(r#"{ "catalog": {} }"#, Path::new("a.json"), &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::Shape { .. }), "{err}");
        assert!(err.to_string().contains("a.json"), "{err}");
        let err = convert_str("{ not json", Path::new("b.json"), &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::Parse { .. }), "{err}");
    }

    #[test]
    fn empty_table_list_converts_to_empty_document() {
        let source = r#"{ "catalog": { "tables": ["java.util.ArrayList", []] } }"#;
        let conversion = convert_str(source, Path::new("empty.json"), &ConvertOptions::default()).unwrap();
        assert_eq!(conversion.dbml, "");
        assert_eq!(conversion.tables, 0);
    }

    #[test]
    fn file_conversion_writes_output_and_names_failures() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("shop.json");
        let output = dir.path().join("out").join("shop.dbml");
        std::fs::write(&input, scenario_doc().to_string()).unwrap();

        let conversion = convert_file(&input, Some(&output), &ConvertOptions::default()).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), conversion.dbml);
        assert!(!temp_sibling(&output).exists());

        let missing = dir.path().join("nope.json");
        let err = convert_file(&missing, Some(&output), &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::Read { .. }));
        assert!(err.to_string().contains("nope.json"), "{err}");
    }
}
