//! Database access layer with connection pooling and migrations
//!
//! The subscription store lives in `subscriptions`; this module owns the
//! pool, encryption setup, schema and the row/column conversions shared by
//! every query.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::Row;
use rust_decimal::Decimal;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{Cycle, Subscription};

mod subscriptions;

pub(crate) use subscriptions::insert_subscription_record;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "SUBTRACK_DB_KEY";

/// Column list matching [`row_to_subscription`]
pub(crate) const SUBSCRIPTION_COLUMNS: &str =
    "id, name, amount, cycle, next_due, category, notes, created_at, updated_at";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Derive an encryption key from a passphrase using Argon2
///
/// The salt is fixed per application so a passphrase opens the database
/// wherever the file is moved.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Changing this invalidates every existing encrypted database
    const APP_SALT: &[u8; 16] = b"subtrack-salt-v1";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let hash = Argon2::default()
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let output = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(output.as_bytes()))
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

/// Parse an RFC 3339 timestamp column
pub(crate) fn parse_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

/// Parse a `YYYY-MM-DD` date column
pub(crate) fn parse_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Map a row selected with [`SUBSCRIPTION_COLUMNS`]
pub(crate) fn row_to_subscription(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    let amount: String = row.get(2)?;
    let cycle: String = row.get(3)?;

    Ok(Subscription {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: Decimal::from_str(&amount).map_err(|e| conversion_error(2, e))?,
        cycle: Cycle::from_str(&cycle).map_err(|e| conversion_error(3, e))?,
        next_due: parse_date(row, 4)?,
        category: row.get(5)?,
        notes: row.get(6)?,
        created_at: parse_datetime(row, 7)?,
        updated_at: parse_datetime(row, 8)?,
    })
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
    encrypted: bool,
}

impl Database {
    /// Open (or create) an encrypted database
    ///
    /// Requires `SUBTRACK_DB_KEY` to hold the passphrase. The file is
    /// encrypted with SQLCipher using a key derived via Argon2. Use
    /// `new_unencrypted()` for development databases.
    pub fn new(path: &str) -> Result<Self> {
        match std::env::var(DB_KEY_ENV).ok() {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for unencrypted databases.",
                DB_KEY_ENV
            ))),
        }
    }

    /// Open (or create) a database without encryption
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Open (or create) a database with an explicit passphrase
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            // Every pooled connection must be keyed before first use
            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                Ok(())
            });

            Pool::builder().max_size(10).build(manager)?
        } else {
            Pool::builder().max_size(10).build(manager)?
        };

        let db = Self {
            pool,
            db_path: path.to_string(),
            encrypted: passphrase.is_some(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Create a throwaway database (for testing)
    ///
    /// Backed by a temporary file rather than `:memory:` so every pooled
    /// connection sees the same data.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir()
            .join(format!("subtrack_test_{}_{}.db", std::process::id(), id))
            .to_string_lossy()
            .into_owned();

        let _ = std::fs::remove_file(&path);

        Self::new_unencrypted(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL: readers don't block the single writer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- AUTOINCREMENT keeps ids from being reused after a delete
            CREATE TABLE IF NOT EXISTS subscriptions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                amount TEXT NOT NULL,                      -- canonical decimal text
                cycle TEXT NOT NULL CHECK (cycle IN ('monthly', 'annual', 'one-time')),
                next_due DATE NOT NULL,                    -- YYYY-MM-DD
                category TEXT NOT NULL,
                notes TEXT,
                created_at DATETIME NOT NULL,              -- RFC 3339
                updated_at DATETIME NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_subscriptions_next_due ON subscriptions(next_due);
            CREATE INDEX IF NOT EXISTS idx_subscriptions_category ON subscriptions(category);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
