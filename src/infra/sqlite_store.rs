use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use crate::app::ports::{DerivedStorePort, ErrorStorePort};

/// SQLite-backed Error Store. Records are append-only: the first failure
/// recorded for a URI-M wins and later inserts are ignored.
pub struct SqliteErrorStore {
    conn: Mutex<Connection>,
}

impl SqliteErrorStore {
    pub fn open_at_root<P: AsRef<Path>>(data_root: P) -> anyhow::Result<Self> {
        let db_path = data_root.as_ref().join("stores").join("errors.db");
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            CREATE TABLE IF NOT EXISTS memento_errors (
                urim        TEXT PRIMARY KEY,
                error_info  TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

#[async_trait]
impl ErrorStorePort for SqliteErrorStore {
    async fn record(&self, urim: &str, info: &str) -> Result<(), String> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO memento_errors (urim, error_info) VALUES (?1, ?2)",
            params![urim, info],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    async fn lookup(&self, urim: &str) -> Result<Option<String>, String> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT error_info FROM memento_errors WHERE urim = ?1",
            params![urim],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| e.to_string())
    }
}

/// SQLite-backed Derived-Value Store. Each field upserts with COALESCE so a
/// populated value is never overwritten, making racing memoizers harmless.
pub struct SqliteDerivedStore {
    conn: Mutex<Connection>,
}

impl SqliteDerivedStore {
    pub fn open_at_root<P: AsRef<Path>>(data_root: P) -> anyhow::Result<Self> {
        let db_path = data_root.as_ref().join("stores").join("derived.db");
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            CREATE TABLE IF NOT EXISTS derived_values (
                urim             TEXT PRIMARY KEY,
                bpfree           TEXT,
                raw_fingerprint  INTEGER
            );
            CREATE INDEX IF NOT EXISTS idx_derived_fingerprint
                ON derived_values (raw_fingerprint);
            "#,
        )?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

#[async_trait]
impl DerivedStorePort for SqliteDerivedStore {
    async fn bpfree(&self, urim: &str) -> Result<Option<String>, String> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT bpfree FROM derived_values WHERE urim = ?1 AND bpfree IS NOT NULL",
            params![urim],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| e.to_string())
    }

    async fn put_bpfree(&self, urim: &str, text: &str) -> Result<(), String> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO derived_values (urim, bpfree) VALUES (?1, ?2)
             ON CONFLICT(urim) DO UPDATE SET bpfree = COALESCE(derived_values.bpfree, excluded.bpfree)",
            params![urim, text],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    async fn fingerprint(&self, urim: &str) -> Result<Option<u64>, String> {
        let conn = self.conn.lock().unwrap();
        let value: Option<i64> = conn
            .query_row(
                "SELECT raw_fingerprint FROM derived_values
                 WHERE urim = ?1 AND raw_fingerprint IS NOT NULL",
                params![urim],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| e.to_string())?;
        Ok(value.map(|v| v as u64))
    }

    async fn put_fingerprint(&self, urim: &str, fingerprint: u64) -> Result<(), String> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO derived_values (urim, raw_fingerprint) VALUES (?1, ?2)
             ON CONFLICT(urim) DO UPDATE SET
               raw_fingerprint = COALESCE(derived_values.raw_fingerprint, excluded.raw_fingerprint)",
            params![urim, fingerprint as i64],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    async fn urims_with_fingerprint(&self, fingerprint: u64) -> Result<Vec<String>, String> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT urim FROM derived_values WHERE raw_fingerprint = ?1 ORDER BY urim")
            .map_err(|e| e.to_string())?;
        let rows = stmt
            .query_map(params![fingerprint as i64], |row| row.get(0))
            .map_err(|e| e.to_string())?;
        rows.collect::<rusqlite::Result<Vec<String>>>()
            .map_err(|e| e.to_string())
    }
}
