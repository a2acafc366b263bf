//! Conversion knobs. Everything comes from CLI flags; nothing is read from the environment.
use clap::ValueEnum;

/// How identifiers that fail `^[A-Za-z_][A-Za-z0-9_]*$` are quoted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum IdentQuote {
    /// `"name"`, inner `"` escaped
    #[default]
    Double,
    /// `` `name` ``
    Backtick,
}

/// How column default expressions are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DefaultStyle {
    /// backtick-wrapped verbatim expression
    #[default]
    Raw,
    /// SQL-looking values become double-quoted string literals
    Sql,
}

/// Which table field names a `Table` block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TableNaming {
    /// `name`, falling back to `full-name`
    #[default]
    Name,
    /// `full-name`, falling back to `name`
    FullName,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub identifier_quote: IdentQuote,
    pub defaults: DefaultStyle,
    pub table_names: TableNaming,
}
