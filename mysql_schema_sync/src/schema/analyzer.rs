//! Live schema introspection
//!
//! Reads a database's table inventory from `information_schema` and the
//! literal `SHOW CREATE TABLE` text per table, and feeds both through the
//! DDL parser. Tables that fail to parse or validate are dropped with a
//! warning; introspection of the remaining tables continues.

use sqlx::{FromRow, MySqlPool, Row};
use tracing::warn;

use crate::error::Result;
use crate::schema::parser;
use crate::schema::types::{Schema, Table};

#[derive(FromRow)]
struct TableRow {
    table_name: String,
    row_format: Option<String>,
}

#[derive(FromRow)]
struct ColumnRow {
    column_name: String,
    ordinal_position: u64,
}

/// Schema analyzer for one live database
pub struct SchemaAnalyzer<'a> {
    pool: &'a MySqlPool,
    database: &'a str,
}

impl<'a> SchemaAnalyzer<'a> {
    pub fn new(pool: &'a MySqlPool, database: &'a str) -> Self {
        Self { pool, database }
    }

    /// Introspect every table of the database into a schema
    pub async fn analyze(&self) -> Result<Schema> {
        let mut schema = Schema::new(self.database);

        let sql = "SELECT TABLE_NAME AS table_name, ROW_FORMAT AS row_format \
                   FROM information_schema.TABLES \
                   WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'";
        let table_rows = sqlx::query_as::<_, TableRow>(sql)
            .bind(self.database)
            .fetch_all(self.pool)
            .await?;

        for row in table_rows {
            match self.analyze_table(&row).await {
                Ok(table) if table.is_valid() => schema.add_table(table),
                Ok(table) => warn!(
                    database = self.database,
                    table = %table.name,
                    "Table failed validation (missing engine or charset), dropped"
                ),
                Err(e) => warn!(
                    database = self.database,
                    table = %row.table_name,
                    error = %e,
                    "Table introspection failed, dropped"
                ),
            }
        }

        Ok(schema)
    }

    async fn analyze_table(&self, row: &TableRow) -> Result<Table> {
        let create_row = sqlx::query(&format!("SHOW CREATE TABLE `{}`", row.table_name))
            .fetch_one(self.pool)
            .await?;
        // two columns: table name, CREATE TABLE text
        let create_text: String = create_row.try_get(1)?;

        let sql = "SELECT COLUMN_NAME AS column_name, ORDINAL_POSITION AS ordinal_position \
                   FROM information_schema.COLUMNS \
                   WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? \
                   ORDER BY ORDINAL_POSITION";
        let column_rows = sqlx::query_as::<_, ColumnRow>(sql)
            .bind(self.database)
            .bind(&row.table_name)
            .fetch_all(self.pool)
            .await?;
        let ordered_columns: Vec<(String, u32)> = column_rows
            .into_iter()
            .map(|c| (c.column_name, c.ordinal_position as u32))
            .collect();

        let mut table = parser::parse_live_table(&row.table_name, &ordered_columns, &create_text)?;

        // SHOW CREATE TABLE omits ROW_FORMAT unless it was set explicitly;
        // information_schema still knows it.
        if table.row_format.is_none() {
            if let Some(row_format) = &row.row_format {
                if !row_format.is_empty() {
                    table.row_format = Some(row_format.clone());
                }
            }
        }

        Ok(table)
    }
}
