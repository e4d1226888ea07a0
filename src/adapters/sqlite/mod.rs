//! SQLite adapter: Implementation of Storage.
//!
//! Provides persistence for user profiles and the health record log.
//!
//! # Append-only records
//!
//! `health_records` carries triggers that abort any UPDATE or DELETE, so the
//! log stays immutable even if another tool opens the database.
//!
//! # Mutex Behavior
//!
//! Database connection is protected by `Mutex`. A poisoned mutex (from panic
//! in another thread) will cause panic. This fail-fast behavior is intentional
//! for data integrity in healthcare applications.
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use crate::domain::{
    HealthRecord, NewHealthRecord, NewUser, RiskPercent, RiskTriple, User, UserUpdate,
};
use crate::ports::Storage;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    Conflict(String),
}

/// SQLite storage adapter.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

const RECORD_COLUMNS: &str = "id, username, symptoms, diabetes, heart, kidney, created_at";
const USER_COLUMNS: &str = "id, username, password_hash, phone";

impl SqliteStorage {
    /// Create a new SQLite storage with the given database path.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or initialized.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Create an in-memory SQLite database (for testing).
    ///
    /// # Errors
    /// Returns error if database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock().expect("Lock failed");

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                phone TEXT
            );

            CREATE TABLE IF NOT EXISTS health_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                symptoms TEXT NOT NULL,
                diabetes INTEGER NOT NULL CHECK (diabetes BETWEEN 0 AND 100),
                heart INTEGER NOT NULL CHECK (heart BETWEEN 0 AND 100),
                kidney INTEGER NOT NULL CHECK (kidney BETWEEN 0 AND 100),
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_records_user_created
                ON health_records(username, created_at DESC);

            CREATE TRIGGER IF NOT EXISTS health_records_no_update
                BEFORE UPDATE ON health_records
                BEGIN SELECT RAISE(ABORT, 'health records are append-only'); END;

            CREATE TRIGGER IF NOT EXISTS health_records_no_delete
                BEFORE DELETE ON health_records
                BEGIN SELECT RAISE(ABORT, 'health records are append-only'); END;
            ",
        )?;

        Ok(())
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            phone: row.get(3)?,
        })
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<HealthRecord> {
        let percent = |idx: usize| -> rusqlite::Result<RiskPercent> {
            let value: i64 = row.get(idx)?;
            Ok(RiskPercent::from_percentage(value as f64))
        };
        let created_at_str: String = row.get(6)?;

        // Timestamps are only ever written by `append_record` as RFC 3339.
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
            })?;

        Ok(HealthRecord {
            id: row.get(0)?,
            username: row.get(1)?,
            symptoms: row.get(2)?,
            risks: RiskTriple::new(percent(3)?, percent(4)?, percent(5)?),
            created_at,
        })
    }

    fn is_constraint_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
        )
    }
}

impl Storage for SqliteStorage {
    type Error = StorageError;

    fn create_user(&self, user: &NewUser) -> Result<User, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        let inserted = conn.execute(
            "INSERT INTO users (username, password_hash, phone) VALUES (?1, ?2, ?3)",
            params![user.username, user.password_hash, user.phone],
        );
        match inserted {
            Ok(_) => {}
            Err(e) if Self::is_constraint_violation(&e) => {
                return Err(StorageError::Conflict(format!("user {}", user.username)));
            }
            Err(e) => return Err(e.into()),
        }

        let id = conn.last_insert_rowid();
        tracing::debug!("Created user row {}", id);
        Ok(User {
            id,
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            phone: user.phone.clone(),
        })
    }

    fn find_user(&self, username: &str) -> Result<Option<User>, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                params![username],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn update_user(&self, username: &str, update: &UserUpdate) -> Result<User, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        // COALESCE keeps the stored value for fields the update leaves out.
        let changed = conn.execute(
            r"
            UPDATE users
               SET phone = COALESCE(?2, phone),
                   password_hash = COALESCE(?3, password_hash)
             WHERE username = ?1
            ",
            params![username, update.phone, update.password_hash],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(format!("user {username}")));
        }

        let user = conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            params![username],
            Self::row_to_user,
        )?;
        Ok(user)
    }

    fn append_record(&self, record: &NewHealthRecord) -> Result<HealthRecord, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");
        let created_at = chrono::Utc::now();

        conn.execute(
            r"
            INSERT INTO health_records (
                username, symptoms, diabetes, heart, kidney, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                record.username,
                record.symptoms,
                i64::from(record.risks.diabetes.value()),
                i64::from(record.risks.heart.value()),
                i64::from(record.risks.kidney.value()),
                created_at.to_rfc3339(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        tracing::debug!("Appended health record {}", id);

        Ok(HealthRecord {
            id,
            username: record.username.clone(),
            symptoms: record.symptoms.clone(),
            risks: record.risks,
            created_at,
        })
    }

    fn get_record(&self, id: i64) -> Result<Option<HealthRecord>, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        let record = conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM health_records WHERE id = ?1"),
                params![id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn records_for_user(&self, username: &str) -> Result<Vec<HealthRecord>, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        let mut stmt = conn.prepare(&format!(
            r"
            SELECT {RECORD_COLUMNS}
            FROM health_records
            WHERE username = ?1
            ORDER BY created_at DESC, id DESC
            "
        ))?;

        let records = stmt
            .query_map(params![username], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn count_records(&self) -> Result<usize, Self::Error> {
        let conn = self.conn.lock().expect("Lock failed");

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM health_records",
            [],
            |row| row.get(0),
        )?;

        Ok(count as usize)
    }
}
