//! Embedded SQLite store
//!
//! One table per file type holds the canonical columns together with
//! `source_file`, `mdr_report_key` and an `extra_fields` JSON object of
//! passthrough columns. Dates are stored as ISO-8601 text and flags as 0/1.

use super::{ProvenanceSink, Storage, check_batch, file_type_for_table};
use crate::app::models::{CanonicalRecord, FieldValue, FileType, ProvenanceEntry};
use crate::app::services::field_transformer::{ColumnType, canonical_columns};
use crate::constants::tables;
use crate::{Error, Result};
use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Time a writer waits on another connection's lock before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(300);

pub struct SqliteStorage {
    pub(crate) conn: Connection,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStorage")
            .field("path", &self.path)
            .finish()
    }
}

impl SqliteStorage {
    /// Open or create a database file and make sure every table exists
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::io(format!("Failed to create database directory {}", parent.display()), e)
            })?;
        }

        let conn = Connection::open(path).map_err(|e| {
            Error::storage_with_source(format!("Failed to open database {}", path.display()), e)
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let storage = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn, path: None };
        storage.init_schema()?;
        Ok(storage)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn init_schema(&self) -> Result<()> {
        let mut ddl = String::new();

        for file_type in FileType::ALL {
            let table = file_type.table_name();
            let columns = canonical_columns(file_type)
                .into_iter()
                .map(|(name, column_type)| format!("    \"{}\" {},\n", name, sql_type(column_type)))
                .collect::<String>();

            ddl.push_str(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (\n    id INTEGER PRIMARY KEY,\n    source_file TEXT NOT NULL,\n    mdr_report_key TEXT NOT NULL,\n{columns}    extra_fields TEXT NOT NULL DEFAULT '{{}}'\n);\nCREATE INDEX IF NOT EXISTS idx_{table}_source_file ON {table}(source_file);\nCREATE INDEX IF NOT EXISTS idx_{table}_report_key ON {table}(mdr_report_key);\n"
            ));
        }

        ddl.push_str(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source_file TEXT NOT NULL,
                file_type TEXT,
                loaded_at TEXT NOT NULL,
                schema_name TEXT,
                rows_read INTEGER NOT NULL,
                rows_accepted INTEGER NOT NULL,
                rows_rejected INTEGER NOT NULL,
                status TEXT NOT NULL,
                elapsed_ms INTEGER NOT NULL,
                resumed_from INTEGER,
                error TEXT
            );
            "#,
            tables::PROVENANCE
        ));

        self.conn.execute_batch(&ddl)?;
        Ok(())
    }

    /// Rows in a canonical table, optionally restricted to one source file
    pub fn row_count(&self, table: &str, source_file: Option<&str>) -> Result<u64> {
        file_type_for_table(table)?;

        let count: i64 = match source_file {
            Some(source) => self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE source_file = ?1", table),
                params![source],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?,
        };
        Ok(count as u64)
    }

    /// Number of provenance entries recorded for a source file
    pub fn provenance_count(&self, source_file: &str) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE source_file = ?1", tables::PROVENANCE),
            params![source_file],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

fn sql_type(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Text | ColumnType::Date => "TEXT",
        ColumnType::Integer | ColumnType::Boolean => "INTEGER",
    }
}

fn sql_value(value: Option<&FieldValue>) -> Value {
    match value {
        None | Some(FieldValue::Null) => Value::Null,
        Some(FieldValue::Text(text)) => Value::Text(text.clone()),
        Some(FieldValue::Integer(i)) => Value::Integer(*i),
        Some(FieldValue::Date(date)) => Value::Text(date.format("%Y-%m-%d").to_string()),
        Some(FieldValue::Boolean(b)) => Value::Integer(i64::from(*b)),
    }
}

fn extra_json(record: &CanonicalRecord) -> Result<String> {
    let extra: BTreeMap<&str, &str> = record
        .extra()
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    Ok(serde_json::to_string(&extra)?)
}

impl Storage for SqliteStorage {
    fn bulk_insert(&mut self, table: &str, records: &[CanonicalRecord]) -> Result<usize> {
        let file_type = file_type_for_table(table)?;
        check_batch(table, records)?;
        if records.is_empty() {
            return Ok(0);
        }

        let columns = canonical_columns(file_type);
        let column_list = columns
            .iter()
            .map(|(name, _)| format!("\"{}\"", name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=columns.len() + 3)
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} (source_file, mdr_report_key, {}, extra_fields) VALUES ({})",
            table, column_list, placeholders
        );

        // Dropping the transaction without commit rolls the batch back
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(&sql)?;
            for record in records {
                let mut values = Vec::with_capacity(columns.len() + 3);
                values.push(Value::Text(record.source_file().to_string()));
                values.push(Value::Text(record.report_key().to_string()));
                values.extend(columns.iter().map(|(name, _)| sql_value(record.get(name))));
                values.push(Value::Text(extra_json(record)?));
                stmt.execute(params_from_iter(values))?;
            }
        }
        tx.commit()?;

        debug!("Inserted {} rows into {}", records.len(), table);
        Ok(records.len())
    }

    fn delete_where(&mut self, table: &str, source_file: &str) -> Result<usize> {
        file_type_for_table(table)?;
        let removed = self.conn.execute(
            &format!("DELETE FROM {} WHERE source_file = ?1", table),
            params![source_file],
        )?;
        debug!("Deleted {} rows of {} from {}", removed, source_file, table);
        Ok(removed)
    }

    fn checkpoint(&mut self) -> Result<()> {
        let mut stmt = self.conn.prepare("PRAGMA wal_checkpoint(TRUNCATE)")?;
        let mut rows = stmt.query([])?;
        while rows.next()?.is_some() {}
        Ok(())
    }
}

impl ProvenanceSink for SqliteStorage {
    fn append(&mut self, entry: &ProvenanceEntry) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (source_file, file_type, loaded_at, schema_name, rows_read, \
                 rows_accepted, rows_rejected, status, elapsed_ms, resumed_from, error) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                tables::PROVENANCE
            ),
            params![
                entry.source_file,
                entry.file_type.map(|t| t.as_str()),
                entry.loaded_at.to_rfc3339(),
                entry.schema,
                entry.rows_read as i64,
                entry.rows_accepted as i64,
                entry.rows_rejected as i64,
                entry.status.to_string(),
                entry.elapsed_ms as i64,
                entry.resumed_from.map(|row| row as i64),
                entry.error,
            ],
        )?;
        Ok(())
    }
}
