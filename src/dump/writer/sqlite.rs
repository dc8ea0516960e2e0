//! Plain-text SQL dump of a SQLite database.
//!
//! The output is a script that rebuilds the schema and rows when fed to a
//! fresh database: tables with their rows first, then indexes, views and
//! triggers in creation order, all inside one transaction.

use crate::dump::result_error::result::Result;
use crate::dump::writer::DumpWriter;
use bon::Builder;
use chrono::Local;
use itertools::Itertools;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::io::Write;
use tracing::{debug, info};

static TABLES_QUERY: &str = "SELECT name, sql FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND sql IS NOT NULL \
     ORDER BY name";

static OBJECTS_QUERY: &str = "SELECT name, sql FROM sqlite_master \
     WHERE type IN ('index', 'view', 'trigger') AND sql IS NOT NULL \
     ORDER BY CASE type WHEN 'index' THEN 0 WHEN 'view' THEN 1 ELSE 2 END, rowid";

static SEQUENCE_TABLE: &str = "sqlite_sequence";

#[derive(Debug, Clone, Builder)]
pub struct SqliteDumpWriter {
    /// Emit `INSERT` statements for every row.
    #[builder(default = true)]
    include_data: bool,
    /// Emit the leading comment block.
    #[builder(default = true)]
    header: bool,
}

impl Default for SqliteDumpWriter {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl DumpWriter<Connection> for SqliteDumpWriter {
    fn write_dump(&self, connection: &Connection, out: &mut dyn Write) -> Result<()> {
        if self.header {
            writeln!(out, "-- {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))?;
            writeln!(out, "-- SQLite version: {}", rusqlite::version())?;
            writeln!(out, "-- Generated at: {}", Local::now().to_rfc3339())?;
            writeln!(out)?;
        }
        writeln!(out, "PRAGMA foreign_keys=OFF;")?;
        writeln!(out, "BEGIN TRANSACTION;")?;

        let tables = schema_entries(connection, TABLES_QUERY)?;
        for (name, sql) in &tables {
            writeln!(out, "{sql};")?;
            if self.include_data {
                write_rows(connection, name, out)?;
            }
        }

        if self.include_data && has_table(connection, SEQUENCE_TABLE)? {
            writeln!(out, "DELETE FROM {};", quote_ident(SEQUENCE_TABLE))?;
            write_rows(connection, SEQUENCE_TABLE, out)?;
        }

        for (_, sql) in schema_entries(connection, OBJECTS_QUERY)? {
            writeln!(out, "{sql};")?;
        }

        writeln!(out, "COMMIT;")?;
        info!("Dumped {} tables", tables.len());
        Ok(())
    }
}

fn schema_entries(connection: &Connection, query: &str) -> Result<Vec<(String, String)>> {
    let mut stmt = connection.prepare(query)?;
    let entries = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}

fn has_table(connection: &Connection, name: &str) -> Result<bool> {
    let count: i64 = connection.query_row(
        "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn write_rows(connection: &Connection, table: &str, out: &mut dyn Write) -> Result<()> {
    let ident = quote_ident(table);
    let mut stmt = connection.prepare(&format!("SELECT * FROM {ident}"))?;
    let column_count = stmt.column_count();
    let mut rows = stmt.query([])?;
    let mut row_count = 0usize;
    while let Some(row) = rows.next()? {
        let values = (0..column_count)
            .map(|i| row.get_ref(i).map(sql_literal))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        writeln!(out, "INSERT INTO {ident} VALUES({});", values.iter().join(","))?;
        row_count += 1;
    }
    debug!("Dumped {row_count} rows from {table:?}");
    Ok(())
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn hex_literal(bytes: &[u8]) -> String {
    format!("X'{}'", bytes.iter().map(|x| format!("{x:02X}")).join(""))
}

pub fn sql_literal(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) if f.is_nan() => "NULL".to_string(),
        ValueRef::Real(f) if f.is_infinite() && f > 0.0 => "1e999".to_string(),
        ValueRef::Real(f) if f.is_infinite() => "-1e999".to_string(),
        // Debug keeps the decimal point, so the value reads back as REAL
        ValueRef::Real(f) => format!("{f:?}"),
        ValueRef::Text(t) => match std::str::from_utf8(t) {
            Ok(text) => format!("'{}'", text.replace('\'', "''")),
            // keep the raw bytes of TEXT that is not valid UTF-8
            Err(_) => format!("CAST({} AS TEXT)", hex_literal(t)),
        },
        ValueRef::Blob(b) => hex_literal(b),
    }
}
