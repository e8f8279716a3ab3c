use crate::storage::KeyValueStore;
use crate::storage::queries;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct StoredEntry {
    pub key: String,
    pub updated_at: i64,
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create DB directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite DB: {}", path.display()))?;

        let store = Self { conn };
        store.init_schema()?;

        Ok(store)
    }

    pub fn init_schema(&self) -> Result<()> {
        queries::schema_statements()
            .iter()
            .try_for_each(|statement| {
                self.conn
                    .execute(statement, [])
                    .context("Failed to initialize schema")
                    .map(|_| ())
            })
    }

    pub fn entries(&self) -> Result<Vec<StoredEntry>> {
        let mut statement = self.conn.prepare(queries::SELECT_ENTRIES)?;

        let rows = statement
            .query_map([], |row| {
                Ok(StoredEntry {
                    key: row.get(0)?,
                    updated_at: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list stored keys")?;

        Ok(rows)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(queries::SELECT_VALUE, params![key], |row| row.get(0))
            .optional()
            .with_context(|| format!("Failed to read stored key: {key}"))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                queries::UPSERT_VALUE,
                params![key, value, Utc::now().timestamp()],
            )
            .with_context(|| format!("Failed to write stored key: {key}"))?;

        Ok(())
    }
}
