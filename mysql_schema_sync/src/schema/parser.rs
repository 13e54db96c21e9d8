//! DDL parser
//!
//! Builds [`Table`] values from the two input forms: the literal
//! `SHOW CREATE TABLE` text paired with an introspected column list, and a
//! line-oriented scan over a static SQL script. Both forms produce
//! identical tables so live and file sources diff cleanly against each
//! other.

use tracing::warn;

use crate::error::{Error, Result};
use crate::schema::types::{Column, Schema, Table};

/// Parse one table from live introspection output.
///
/// `ordered_columns` is the (name, ordinal position) list read from
/// `information_schema.COLUMNS`, already ordered by position;
/// `create_text` is the literal multi-line `SHOW CREATE TABLE` payload.
///
/// The first line of the payload (the `CREATE TABLE` header) is discarded,
/// the next N lines are column definitions assigned by position, the lines
/// up to the last are key/index lines, and the final line carries the
/// table attributes.
pub fn parse_live_table(
    name: &str,
    ordered_columns: &[(String, u32)],
    create_text: &str,
) -> Result<Table> {
    let lines: Vec<&str> = create_text.lines().collect();
    let column_count = ordered_columns.len();
    // header + N columns + closing attribute line at minimum
    if lines.len() < column_count + 2 {
        return Err(Error::Parse {
            source_name: name.to_string(),
            message: format!(
                "CREATE TABLE text has {} lines for {} columns",
                lines.len(),
                column_count
            ),
        });
    }

    let mut table = Table::new(name);

    for (i, (column_name, ordinal)) in ordered_columns.iter().enumerate() {
        let definition = strip_trailing_comma(lines[i + 1].trim());
        table.add_column(Column::new(column_name, *ordinal, definition));
    }

    for line in &lines[column_count + 1..lines.len() - 1] {
        let entry = normalize_index(line);
        if entry.starts_with("PRIMARY KEY") {
            table.primary_key = Some(entry);
        } else {
            table.add_index(entry);
        }
    }

    parse_attributes(&mut table, lines[lines.len() - 1]);

    Ok(table)
}

/// Parse a whole SQL script into a schema.
///
/// Unparseable or invalid tables are skipped with a warning; a bad table
/// never fails the overall parse.
pub fn parse_script(source_name: &str, text: &str) -> Schema {
    let mut schema = Schema::new(source_name);
    let mut table: Option<Table> = None;
    let mut ordinal: u32 = 1;

    for raw_line in text.lines() {
        let line = raw_line.trim();

        if table.is_none() {
            if line.starts_with("CREATE TABLE") {
                match table_name_from_header(line) {
                    Some(name) => {
                        table = Some(Table::new(name));
                        ordinal = 1;
                    }
                    None => {
                        warn!(
                            source = source_name,
                            line, "Unparseable CREATE TABLE header, skipping"
                        );
                    }
                }
            }
            continue;
        }

        if line.starts_with(')') {
            // closing/attribute line commits the table
            let mut finished = table.take().unwrap_or_default();
            parse_attributes(&mut finished, line);
            if finished.is_valid() {
                schema.add_table(finished);
            } else {
                warn!(
                    source = source_name,
                    table = %finished.name,
                    "Table failed validation (missing engine or charset), dropped"
                );
            }
            ordinal = 1;
        } else if let Some(current) = table.as_mut() {
            if line.starts_with('`') {
                match column_name_from_definition(line) {
                    Some(name) => {
                        let definition = strip_trailing_comma(line);
                        current.add_column(Column::new(name, ordinal, definition));
                        ordinal += 1;
                    }
                    None => {
                        warn!(
                            source = source_name,
                            line, "Unparseable column definition, skipping"
                        );
                    }
                }
            } else if line.starts_with("PRIMARY KEY") {
                current.primary_key = Some(normalize_index(line));
            } else if line.contains("KEY") || line.contains("INDEX") {
                current.add_index(normalize_index(line));
            }
        }
    }

    schema
}

/// Extract the table name from a `CREATE TABLE` header line.
///
/// Supports the qualified `` `schema`.`table` `` form by taking the
/// segment after the `` `.` `` marker.
fn table_name_from_header(line: &str) -> Option<&str> {
    let start = match line.find("`.`") {
        Some(pos) => pos + 3,
        None => line.find('`')? + 1,
    };
    let end = line.rfind('`')?;
    if start >= end {
        return None;
    }
    Some(&line[start..end])
}

/// Extract the column name from a backtick-led definition line
fn column_name_from_definition(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('`')?;
    let end = rest.find('`')?;
    if end == 0 {
        return None;
    }
    Some(&rest[..end])
}

/// Strip a single trailing comma from a definition fragment
pub fn strip_trailing_comma(line: &str) -> &str {
    line.strip_suffix(',').unwrap_or(line)
}

/// Normalize a key/index line for comparison.
///
/// BTREE is the implicit default storage method, so an index without an
/// explicit `USING` clause gets ` USING BTREE` appended; two logically
/// identical indexes then compare equal regardless of how the source text
/// spelled them.
pub fn normalize_index(line: &str) -> String {
    let stripped = strip_trailing_comma(line.trim());
    if stripped.contains("USING") {
        stripped.to_string()
    } else {
        format!("{} USING BTREE", stripped)
    }
}

/// Extract the quoted index name token from an index definition.
///
/// Walks the definition as a token stream: the first backtick-quoted
/// identifier that appears before the first unquoted `(` is the index
/// name. Doubled backticks inside the quotes are a literal backtick and
/// are returned as written, so the result can be re-quoted verbatim in a
/// `DROP INDEX` statement. Returns `None` when no name can be extracted
/// (e.g. an exotic expression index); callers warn instead of emitting
/// malformed SQL.
pub fn index_name_token(definition: &str) -> Option<String> {
    let mut chars = definition.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '(' => return None,
            '`' => {
                let mut name = String::new();
                while let Some(inner) = chars.next() {
                    if inner == '`' {
                        if chars.peek() == Some(&'`') {
                            name.push_str("``");
                            chars.next();
                        } else if name.is_empty() {
                            return None;
                        } else {
                            return Some(name);
                        }
                    } else {
                        name.push(inner);
                    }
                }
                // unterminated quote
                return None;
            }
            _ => {}
        }
    }
    None
}

/// Scan the closing line of a `CREATE TABLE` for `KEY=VALUE` attributes.
///
/// Leading `)` and spaces are skipped; a key accumulates until `=` with
/// trailing spaces trimmed, a value until the next space or `;`. ENGINE,
/// AUTO_INCREMENT, ROW_FORMAT and DEFAULT CHARSET / CHARACTER SET land in
/// dedicated fields, everything else in the generic attribute list.
pub fn parse_attributes(table: &mut Table, line: &str) {
    let chars: Vec<char> = line.chars().collect();
    let size = chars.len();
    let mut key = String::new();
    let mut value = String::new();
    let mut skip = true;
    let mut i = 0;

    while i < size {
        let c = chars[i];
        if skip && (c == ')' || c == ' ') {
            i += 1;
            continue;
        }
        skip = false;
        if c == '=' {
            while key.ends_with(' ') {
                key.pop();
            }
            while i + 1 < size && chars[i + 1] == ' ' {
                i += 1;
            }
            let mut k = i + 1;
            while k < size {
                let vc = chars[k];
                if vc == ' ' || vc == ';' {
                    break;
                }
                value.push(vc);
                k += 1;
            }
            i = k;

            handle_attribute(table, &key, &value);
            key.clear();
            value.clear();
            skip = true;
            i += 1;
            continue;
        }
        key.push(c);
        i += 1;
    }
}

fn handle_attribute(table: &mut Table, key: &str, value: &str) {
    if key.contains("ENGINE") {
        table.engine = Some(value.to_string());
    } else if key.contains("AUTO_INCREMENT") {
        table.auto_increment = Some(value.to_string());
    } else if key.contains("ROW_FORMAT") {
        table.row_format = Some(value.to_string());
    } else if key.contains("DEFAULT CHARSET") || key.contains("CHARACTER SET") {
        table.charset = Some(value.to_string());
    } else {
        table.attributes.push(format!("{}={}", key, value));
    }
}
