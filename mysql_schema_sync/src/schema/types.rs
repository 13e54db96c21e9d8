//! Type definitions for schema objects
//!
//! A `Table` is the comparable unit of the diff engine: ordered columns,
//! normalized index strings, an optional primary key clause, and the
//! table-level attributes read off the closing line of `CREATE TABLE`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single table column
///
/// Diff equality is decided by `definition` text alone; `ordinal_position`
/// carries the physical declaration order (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub ordinal_position: u32,
    pub definition: String,
}

impl Column {
    /// Create a column from its name, 1-based position and definition fragment
    pub fn new(name: &str, ordinal_position: u32, definition: &str) -> Self {
        Self {
            name: name.to_string(),
            ordinal_position,
            definition: definition.to_string(),
        }
    }
}

/// A database table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    /// Columns in physical declaration order
    pub columns: Vec<Column>,
    /// Normalized index definitions; membership is order-insensitive
    pub indexes: Vec<String>,
    /// Normalized primary key clause, when the table has one
    pub primary_key: Option<String>,
    pub engine: Option<String>,
    pub charset: Option<String>,
    pub row_format: Option<String>,
    /// Remaining `KEY=VALUE` attributes from the closing line, in order
    pub attributes: Vec<String>,
    /// Held apart from `attributes`: a per-instance counter, not schema
    pub auto_increment: Option<String>,
}

impl Table {
    /// Create a new empty table with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    pub fn add_index(&mut self, index: String) {
        self.indexes.push(index);
    }

    pub fn contains_index(&self, index: &str) -> bool {
        self.indexes.iter().any(|i| i == index)
    }

    /// Column names in physical order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Definition text for a column, if the table has it
    pub fn column_definition(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.definition.as_str())
    }

    /// A table is usable only when name, engine and charset are all present
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && self.engine.is_some() && self.charset.is_some()
    }

    /// Table attributes as `KEY=VALUE` strings for diffing
    ///
    /// The auto-increment counter is deliberately absent: it is runtime
    /// state, and including it would make every pair of live tables differ.
    pub fn diff_attributes(&self) -> Vec<String> {
        let mut attrs = Vec::with_capacity(self.attributes.len() + 3);
        if let Some(engine) = &self.engine {
            attrs.push(format!("ENGINE={}", engine));
        }
        if let Some(charset) = &self.charset {
            attrs.push(format!("DEFAULT CHARSET={}", charset));
        }
        if let Some(row_format) = &self.row_format {
            attrs.push(format!("ROW_FORMAT={}", row_format));
        }
        attrs.extend(self.attributes.iter().cloned());
        attrs
    }

    /// Render an executable `CREATE TABLE` statement from the model
    ///
    /// The auto-increment clause is stripped so no stale counter is carried
    /// over to a freshly created table.
    pub fn create_table_ddl(&self) -> String {
        let mut body: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("  {}", c.definition))
            .collect();
        if let Some(pk) = &self.primary_key {
            body.push(format!("  {}", pk));
        }
        for index in &self.indexes {
            body.push(format!("  {}", index));
        }

        format!(
            "CREATE TABLE `{}` (\n{}\n) {}",
            self.name,
            body.join(",\n"),
            self.diff_attributes().join(" ")
        )
    }
}

/// A named collection of tables, parsed from one source
///
/// Insertion order is preserved so generated plans come out in a stable
/// order across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub tables: IndexMap<String, Table>,
}

impl Schema {
    /// Create a new empty schema
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tables: IndexMap::new(),
        }
    }

    /// Add a table, keyed by its name
    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// The authoritative table inventory used for add/modify/delete
    /// classification between two schemas
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}
