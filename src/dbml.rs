//! DBML rendering of the normalized schema.
//!
//! Layout, per table in source order:
//!
//! ```text
//! Table users {
//!   id integer [pk, not null, increment]
//!   Note: 'registered accounts'
//!   indexes {
//!     (a, b) [pk]
//!     (email) [unique]
//!   }
//! }
//! ```
//!
//! followed by one `Ref:` line per resolved foreign-key column pair.
pub mod escape;
pub mod ident;

use crate::config::ConvertOptions;
use crate::ir::{Column, ForeignKey, IndexBlock, IndexKind, Schema, Table};

use ident::{ident, type_token};

pub fn render(schema: &Schema, options: &ConvertOptions) -> String {
    let mut writer = DbmlWriter::new(options);
    writer.emit(schema);
    writer.into_string()
}

pub struct DbmlWriter<'o> {
    options: &'o ConvertOptions,
    out: String,
}

impl<'o> DbmlWriter<'o> {
    pub fn new(options: &'o ConvertOptions) -> Self {
        Self { options, out: String::new() }
    }

    pub fn into_string(self) -> String {
        self.out
    }

    pub fn emit(&mut self, schema: &Schema) {
        for (i, table) in schema.tables.iter().enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            self.table(table);
        }

        let this = &*self;
        let refs: Vec<String> = schema
            .tables
            .iter()
            .flat_map(move |t| t.foreign_keys.iter().flat_map(move |fk| this.refs(t, fk)))
            .collect();
        if !refs.is_empty() {
            if !self.out.is_empty() {
                self.out.push('\n');
            }
            for line in refs {
                self.out.push_str(&line);
                self.out.push('\n');
            }
        }
    }

    fn ident<'s>(&self, name: &'s str) -> std::borrow::Cow<'s, str> {
        ident(name, self.options.identifier_quote)
    }

    // ---- table block ----

    fn table(&mut self, table: &Table) {
        let header = format!("Table {} {{\n", self.ident(&table.name));
        self.out.push_str(&header);

        for column in &table.columns {
            let line = self.column_line(column);
            self.out.push_str(&line);
        }

        if let Some(note) = &table.note {
            self.out.push_str(&format!("  Note: {}\n", escape::note(note)));
        }

        if !table.indexes.is_empty() {
            self.out.push_str("  indexes {\n");
            for block in ordered_indexes(&table.indexes) {
                let line = self.index_line(block);
                self.out.push_str(&line);
            }
            self.out.push_str("  }\n");
        }

        self.out.push_str("}\n");
    }

    fn column_line(&self, column: &Column) -> String {
        let mut attrs: Vec<String> = Vec::new();
        if column.pk {
            attrs.push("pk".into());
        }
        if column.not_null {
            attrs.push("not null".into());
        }
        if column.unique && !column.pk {
            attrs.push("unique".into());
        }
        if column.increment {
            attrs.push("increment".into());
        }
        if let Some(default) = column
            .default
            .as_deref()
            .and_then(|d| escape::default_value(d, self.options.defaults))
        {
            attrs.push(format!("default: {default}"));
        }
        if let Some(note) = &column.note {
            attrs.push(format!("note: {}", escape::note(note)));
        }

        let attr_str = if attrs.is_empty() { String::new() } else { format!(" [{}]", attrs.join(", ")) };
        format!("  {} {}{attr_str}\n", self.ident(&column.name), type_token(&column.ty))
    }

    fn index_line(&self, block: &IndexBlock) -> String {
        let cols = block
            .columns
            .iter()
            .map(|c| self.ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let marker = match block.kind {
            IndexKind::PrimaryKey => "pk",
            IndexKind::Unique => "unique",
        };
        format!("    ({cols}) [{marker}]\n")
    }

    // ---- relationships ----

    fn refs(&self, table: &Table, fk: &ForeignKey) -> Vec<String> {
        let mut opts = Vec::new();
        if let Some(rule) = &fk.delete_rule {
            opts.push(format!("delete: {rule}"));
        }
        if let Some(rule) = &fk.update_rule {
            opts.push(format!("update: {rule}"));
        }
        let opt_str = if opts.is_empty() { String::new() } else { format!(" [{}]", opts.join(", ")) };

        fk.pairs
            .iter()
            .map(|pair| {
                format!(
                    "Ref: {}.{} > {}.{}{opt_str}",
                    self.ident(&fk.ref_table),
                    self.ident(&pair.referenced),
                    self.ident(&table.name),
                    self.ident(&pair.local),
                )
            })
            .collect()
    }
}

/// Composite primary keys first, then unique indexes, each group in walker order.
fn ordered_indexes(blocks: &[IndexBlock]) -> impl Iterator<Item = &IndexBlock> {
    let pks = blocks.iter().filter(|b| b.kind == IndexKind::PrimaryKey);
    let uniques = blocks.iter().filter(|b| b.kind == IndexKind::Unique);
    pks.chain(uniques)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DefaultStyle, IdentQuote};
    use crate::ir::ColumnPair;

    fn col(name: &str, ordinal: i64, ty: &str) -> Column {
        Column { name: name.into(), ordinal, ty: ty.into(), ..Default::default() }
    }

    fn users() -> Table {
        Table {
            name: "public.users".into(),
            note: Some("people's accounts".into()),
            columns: vec![
                Column { pk: true, not_null: true, increment: true, ..col("id", 1, "integer") },
                Column { unique: true, note: Some("login".into()), ..col("email", 2, "varchar(255)") },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn renders_table_block_with_attribute_order() {
        let schema = Schema { tables: vec![users()] };
        let out = render(&schema, &ConvertOptions::default());
        assert_eq!(
            out,
            "Table \"public.users\" {\n\
             \x20 id integer [pk, not null, increment]\n\
             \x20 email varchar(255) [unique, note: 'login']\n\
             \x20 Note: 'people''s accounts'\n\
             }\n"
        );
    }

    #[test]
    fn full_attribute_order_on_one_column() {
        let c = Column {
            pk: true,
            not_null: true,
            unique: true,
            increment: true,
            default: Some("nextval('s')".into()),
            note: Some("n".into()),
            ..col("id", 1, "bigint")
        };
        let options = ConvertOptions::default();
        let writer = DbmlWriter::new(&options);
        assert_eq!(
            writer.column_line(&c),
            "  id bigint [pk, not null, increment, default: `nextval('s')`, note: 'n']\n"
        );
    }

    #[test]
    fn composite_keys_render_before_unique_indexes() {
        let table = Table {
            name: "memberships".into(),
            columns: vec![col("user_id", 1, "int"), col("group id", 2, "int")],
            indexes: vec![
                IndexBlock { kind: IndexKind::Unique, columns: vec!["user_id".into()] },
                IndexBlock { kind: IndexKind::PrimaryKey, columns: vec!["user_id".into(), "group id".into()] },
            ],
            ..Default::default()
        };
        let out = render(&Schema { tables: vec![table] }, &ConvertOptions::default());
        assert!(out.contains(
            "  indexes {\n    (user_id, \"group id\") [pk]\n    (user_id) [unique]\n  }\n}\n"
        ), "{out}");
    }

    #[test]
    fn refs_follow_all_tables_with_rules() {
        let orders = Table {
            name: "orders".into(),
            columns: vec![col("user_id", 1, "int")],
            foreign_keys: vec![ForeignKey {
                ref_table: "users".into(),
                pairs: vec![ColumnPair { local: "user_id".into(), referenced: "id".into() }],
                delete_rule: Some("cascade".into()),
                update_rule: None,
            }],
            ..Default::default()
        };
        let plain_users = Table { name: "users".into(), columns: vec![col("id", 1, "int")], ..Default::default() };
        let out = render(&Schema { tables: vec![orders, plain_users] }, &ConvertOptions::default());
        assert_eq!(
            out,
            "Table orders {\n  user_id int\n}\n\nTable users {\n  id int\n}\n\n\
             Ref: users.id > orders.user_id [delete: cascade]\n"
        );
    }

    #[test]
    fn backtick_and_sql_styles_apply_everywhere() {
        let options = ConvertOptions {
            identifier_quote: IdentQuote::Backtick,
            defaults: DefaultStyle::Sql,
            ..Default::default()
        };
        let table = Table {
            name: "order-items".into(),
            columns: vec![Column { default: Some("now()".into()), ..col("created at", 1, "timestamp with time zone") }],
            foreign_keys: vec![ForeignKey {
                ref_table: "order-items".into(),
                pairs: vec![ColumnPair { local: "created at".into(), referenced: "parent-id".into() }],
                delete_rule: Some("no action".into()),
                update_rule: Some("cascade".into()),
            }],
            ..Default::default()
        };
        let out = render(&Schema { tables: vec![table] }, &options);
        assert!(out.starts_with("Table `order-items` {\n"), "{out}");
        assert!(out.contains("  `created at` \"timestamp with time zone\" [default: \"now()\"]\n"), "{out}");
        assert!(out.ends_with(
            "Ref: `order-items`.`parent-id` > `order-items`.`created at` [delete: no action, update: cascade]\n"
        ), "{out}");
    }

    #[test]
    fn empty_schema_renders_nothing() {
        assert_eq!(render(&Schema::default(), &ConvertOptions::default()), "");
    }
}
