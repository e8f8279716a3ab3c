pub const CREATE_KV_ENTRIES: &str = r#"
CREATE TABLE IF NOT EXISTS kv_entries (
  key        TEXT PRIMARY KEY,
  value      TEXT NOT NULL,
  updated_at INTEGER NOT NULL
);
"#;

pub const INDEX_KV_ENTRIES_UPDATED_AT: &str =
    "CREATE INDEX IF NOT EXISTS idx_kv_entries_updated_at ON kv_entries(updated_at);";

pub const SELECT_VALUE: &str = "SELECT value FROM kv_entries WHERE key = ?1";

pub const UPSERT_VALUE: &str = "INSERT INTO kv_entries (key, value, updated_at)
     VALUES (?1, ?2, ?3)
     ON CONFLICT(key)
     DO UPDATE SET value=excluded.value, updated_at=excluded.updated_at";

pub const SELECT_ENTRIES: &str = "SELECT key, updated_at FROM kv_entries ORDER BY key ASC";

pub fn schema_statements() -> Vec<&'static str> {
    vec![CREATE_KV_ENTRIES, INDEX_KV_ENTRIES_UPDATED_AT]
}
