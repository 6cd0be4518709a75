//! SQLite-backed history slot.
//!
//! Keeps the same single-slot contract as the JSON file: one row in `slots`
//! holds the whole serialized history and is replaced on every write. Updates
//! run in a `BEGIN IMMEDIATE` transaction so other connections wait their turn.

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

mod migrations;

use migrations::run_migrations;

use crate::history::{HistoryStorage, SlotUpdate};

pub const HISTORY_SLOT: &str = "calculationResults";

const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

pub struct SqliteStorage {
    conn: Mutex<Connection>,
    key: String,
    db_path: Option<PathBuf>,
}

impl SqliteStorage {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let conn = Connection::open(&db_path)
            .with_context(|| format!("failed to open SQLite database {}", db_path.display()))?;

        if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
            error!("Failed to enable WAL mode: {err}");
        }
        conn.busy_timeout(BUSY_TIMEOUT)
            .context("failed to set database busy timeout")?;

        let storage = Self::from_connection(conn, Some(db_path))?;
        if let Some(path) = storage.path() {
            info!("Database initialized at {}", path.display());
        }
        Ok(storage)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Self::from_connection(conn, None)
    }

    fn from_connection(mut conn: Connection, db_path: Option<PathBuf>) -> Result<Self> {
        run_migrations(&mut conn).context("failed to run database migrations")?;
        Ok(Self {
            conn: Mutex::new(conn),
            key: HISTORY_SLOT.to_string(),
            db_path,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn with_conn<T>(&self, task: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))?;
        task(&mut conn)
    }
}

fn read_slot(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM slots WHERE key = ?1",
        params![key],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .with_context(|| format!("failed to read slot {key}"))
}

impl HistoryStorage for SqliteStorage {
    fn read(&self) -> Result<Option<String>> {
        self.with_conn(|conn| read_slot(conn, &self.key))
    }

    fn update(&self, apply: &mut SlotUpdate<'_>) -> Result<()> {
        self.with_conn(|conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .context("failed to begin history transaction")?;

            let payload = apply(read_slot(&tx, &self.key)?)?;
            tx.execute(
                "INSERT INTO slots (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                params![self.key, payload, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("failed to write slot {}", self.key))?;

            tx.commit().context("failed to commit history transaction")
        })
    }

    fn describe(&self) -> String {
        match &self.db_path {
            Some(path) => format!("sqlite slot '{}' in {}", self.key, path.display()),
            None => format!("sqlite slot '{}' in memory", self.key),
        }
    }
}
