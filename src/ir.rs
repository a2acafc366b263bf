// Normalized relational model handed to the emitter. No serde_json::Value here.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub tables: Vec<Table>,  // source table-list order
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub name: String,
    pub note: Option<String>,
    pub columns: Vec<Column>,        // ascending ordinal position
    pub indexes: Vec<IndexBlock>,    // composite pk first, then unique indexes
    pub foreign_keys: Vec<ForeignKey>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Column {
    pub name: String,
    pub ordinal: i64,
    pub ty: String,
    pub pk: bool,            // single-column primary key only
    pub not_null: bool,
    pub unique: bool,        // already cleared when implied by `pk`
    pub increment: bool,
    pub default: Option<String>,  // raw expression, sanitized at emit time
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    PrimaryKey,
    Unique,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexBlock {
    pub kind: IndexKind,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForeignKey {
    pub ref_table: String,
    pub pairs: Vec<ColumnPair>,
    pub delete_rule: Option<String>,
    pub update_rule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPair {
    pub local: String,
    pub referenced: String,
}

impl Schema {
    pub fn ref_count(&self) -> usize {
        self.tables
            .iter()
            .flat_map(|t| &t.foreign_keys)
            .map(|fk| fk.pairs.len())
            .sum()
    }
}
