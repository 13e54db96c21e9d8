//! Schema diff engine
//!
//! Computes the minimal ordered DDL statement list that converges a target
//! table to its same-named source table, and partitions two schemas into
//! the per-target create/drop/modify plan.

use indexmap::IndexMap;
use tracing::warn;

use crate::schema::parser::index_name_token;
use crate::schema::types::{Schema, Table};

/// Compute the ordered statement list converging `target` to `source`.
///
/// The steps run in a fixed order because later steps assume earlier ones
/// are conceptually already applied: table attributes, then column drops,
/// then the order-preserving add/move/modify walk, then the primary key,
/// then indexes. Re-running against a target that already reflects the
/// emitted statements yields an empty list.
pub fn table_diff(source: &Table, target: &Table) -> Vec<String> {
    let mut statements = Vec::new();
    let table_name = &target.name;

    // 1. Table attributes, auto-increment excluded. One combined statement.
    let target_attributes = target.diff_attributes();
    let missing: Vec<String> = source
        .diff_attributes()
        .into_iter()
        .filter(|attr| !target_attributes.contains(attr))
        .collect();
    if !missing.is_empty() {
        statements.push(format!("ALTER TABLE `{}` {}", table_name, missing.join(" ")));
    }

    // 2. Columns present only in the target.
    let source_names = source.column_names();
    let mut working: Vec<String> = Vec::with_capacity(target.columns.len());
    for name in target.column_names() {
        if source_names.contains(&name) {
            working.push(name);
        } else {
            statements.push(format!(
                "ALTER TABLE `{}` DROP COLUMN `{}`",
                table_name, name
            ));
        }
    }

    // 3. Walk source columns in ordinal order, converging the working order.
    // The positional clause always names the previous *source* column, so
    // sequential application lands the physical order exactly on the
    // source order. Unchanged, correctly-positioned columns emit nothing.
    for (i, column) in source.columns.iter().enumerate() {
        let position = if i == 0 {
            "FIRST".to_string()
        } else {
            format!("AFTER `{}`", source.columns[i - 1].name)
        };

        match working.iter().position(|name| name == &column.name) {
            Some(j) => {
                let definition_changed =
                    target.column_definition(&column.name) != Some(column.definition.as_str());
                if definition_changed || j != i {
                    statements.push(format!(
                        "ALTER TABLE `{}` MODIFY COLUMN {} {}",
                        table_name, column.definition, position
                    ));
                    let name = working.remove(j);
                    working.insert(i, name);
                }
            }
            None => {
                statements.push(format!(
                    "ALTER TABLE `{}` ADD COLUMN {} {}",
                    table_name, column.definition, position
                ));
                working.insert(i, column.name.clone());
            }
        }
    }

    // 4. Primary key.
    match (&source.primary_key, &target.primary_key) {
        (Some(pk), None) => {
            statements.push(format!("ALTER TABLE `{}` ADD {}", table_name, pk));
        }
        (None, Some(_)) => {
            statements.push(format!("ALTER TABLE `{}` DROP PRIMARY KEY", table_name));
        }
        (Some(source_pk), Some(target_pk)) if source_pk != target_pk => {
            statements.push(format!(
                "ALTER TABLE `{}` DROP PRIMARY KEY, ADD {}",
                table_name, source_pk
            ));
        }
        _ => {}
    }

    // 5. Indexes: drops by quoted name token, adds by verbatim definition.
    for index in &target.indexes {
        if !source.contains_index(index) {
            match index_name_token(index) {
                Some(name) => statements.push(format!(
                    "ALTER TABLE `{}` DROP INDEX `{}`",
                    table_name, name
                )),
                None => warn!(
                    table = %table_name,
                    index = %index,
                    "No quoted name token in index definition, DROP skipped"
                ),
            }
        }
    }
    for index in &source.indexes {
        if !target.contains_index(index) {
            statements.push(format!("ALTER TABLE `{}` ADD {}", table_name, index));
        }
    }

    statements
}

/// The per-target synchronization plan.
///
/// Three disjoint classifications of table names whose union covers both
/// schemas' inventories: tables to create (source-only), tables to drop
/// (target-only), and tables to modify (present in both, with a non-empty
/// statement list).
#[derive(Debug, Clone, Default)]
pub struct DiffPlan {
    /// Table name → CREATE TABLE statement (auto-increment stripped)
    pub create_tables: IndexMap<String, String>,
    /// Table name → DROP TABLE statement
    pub drop_tables: IndexMap<String, String>,
    /// Table name → ordered ALTER statement list
    pub modify_tables: IndexMap<String, Vec<String>>,
}

impl DiffPlan {
    /// Partition table names relative to `source` and attach statements
    pub fn build(source: &Schema, target: &Schema) -> Self {
        let mut plan = DiffPlan::default();

        for name in target.tables.keys() {
            if !source.tables.contains_key(name) {
                plan.drop_tables
                    .insert(name.clone(), format!("DROP TABLE `{}`", name));
            }
        }

        for (name, table) in &source.tables {
            if !target.tables.contains_key(name) {
                plan.create_tables
                    .insert(name.clone(), table.create_table_ddl());
            }
        }

        for (name, source_table) in &source.tables {
            if let Some(target_table) = target.tables.get(name) {
                let statements = table_diff(source_table, target_table);
                if !statements.is_empty() {
                    plan.modify_tables.insert(name.clone(), statements);
                }
            }
        }

        plan
    }

    /// Whether the plan contains no work at all
    pub fn is_empty(&self) -> bool {
        self.create_tables.is_empty()
            && self.drop_tables.is_empty()
            && self.modify_tables.is_empty()
    }

    /// Total number of generated statements
    pub fn statement_count(&self) -> usize {
        self.create_tables.len()
            + self.drop_tables.len()
            + self.modify_tables.values().map(Vec::len).sum::<usize>()
    }

    /// The drop/create statements applied as one batch, drops first
    pub fn table_batch(&self) -> Vec<String> {
        let mut batch = Vec::with_capacity(self.drop_tables.len() + self.create_tables.len());
        batch.extend(self.drop_tables.values().cloned());
        batch.extend(self.create_tables.values().cloned());
        batch
    }

    /// Every statement in application order: drops, creates, then the
    /// per-table modify lists
    pub fn all_statements(&self) -> Vec<&str> {
        let mut all = Vec::with_capacity(self.statement_count());
        all.extend(self.drop_tables.values().map(String::as_str));
        all.extend(self.create_tables.values().map(String::as_str));
        for statements in self.modify_tables.values() {
            all.extend(statements.iter().map(String::as_str));
        }
        all
    }
}
