// ledger/src/adapters/sqlite.rs
use crate::{KeyModification, LedgerError, RwSet, StateAdapter, TxHeader, Version, VersionedValue};
use async_trait::async_trait;
use sqlx::{
    Row,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
};
use tokio::sync::Mutex;

/// SQLite-backed world state
///
/// Schema:
/// ```sql
/// CREATE TABLE world_state (
///     key TEXT PRIMARY KEY,
///     value BLOB NOT NULL,
///     version INTEGER NOT NULL
/// );
///
/// CREATE TABLE history (
///     seq INTEGER PRIMARY KEY AUTOINCREMENT,
///     key TEXT NOT NULL,
///     tx_id TEXT NOT NULL,
///     value BLOB NOT NULL,
///     is_delete INTEGER NOT NULL,
///     timestamp TEXT NOT NULL
/// );
///
/// CREATE TABLE chain_info (
///     id INTEGER PRIMARY KEY CHECK (id = 0),
///     height INTEGER NOT NULL
/// );
/// ```
pub struct SqliteAdapter {
    pub(crate) pool: SqlitePool,
    commit_lock: Mutex<()>,
}

fn storage(err: sqlx::Error) -> LedgerError {
    LedgerError::Storage(err.to_string())
}

fn decode(err: sqlx::Error) -> LedgerError {
    LedgerError::Deserialize(err.to_string())
}

impl SqliteAdapter {
    /// Open (creating if missing) a file-backed database
    pub async fn new_file(path: &str) -> Result<Self, LedgerError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(storage)?;

        Ok(Self::from_pool(pool))
    }

    /// In-memory database. The single connection is never recycled, since
    /// closing it would drop the data.
    pub async fn new_memory() -> Result<Self, LedgerError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(storage)?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            commit_lock: Mutex::new(()),
        }
    }

    /// Initialize the database schema
    pub async fn init_schema(&self) -> Result<(), LedgerError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS world_state (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                version INTEGER NOT NULL
            )
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS history (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                key TEXT NOT NULL,
                tx_id TEXT NOT NULL,
                value BLOB NOT NULL,
                is_delete INTEGER NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_history_key ON history(key, seq)
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chain_info (
                id INTEGER PRIMARY KEY CHECK (id = 0),
                height INTEGER NOT NULL
            )
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        sqlx::query("INSERT OR IGNORE INTO chain_info (id, height) VALUES (0, 0)")
            .execute(&mut *tx)
            .await
            .map_err(storage)?;

        tx.commit().await.map_err(storage)?;

        Ok(())
    }

    fn map_row_to_versioned(row: &SqliteRow) -> Result<VersionedValue, LedgerError> {
        let value: Vec<u8> = row.try_get("value").map_err(decode)?;
        let version: i64 = row.try_get("version").map_err(decode)?;
        Ok(VersionedValue {
            value,
            version: version as Version,
        })
    }

    fn map_row_to_modification(row: SqliteRow) -> Result<KeyModification, LedgerError> {
        let timestamp_str: String = row.try_get("timestamp").map_err(decode)?;
        let timestamp = chrono::DateTime::parse_from_rfc3339(&timestamp_str)
            .map_err(|e| LedgerError::Deserialize(e.to_string()))?
            .with_timezone(&chrono::Utc);

        Ok(KeyModification {
            tx_id: row.try_get("tx_id").map_err(decode)?,
            value: row.try_get("value").map_err(decode)?,
            timestamp,
            is_delete: row.try_get("is_delete").map_err(decode)?,
        })
    }
}

#[async_trait]
impl StateAdapter for SqliteAdapter {
    async fn get_state(&self, key: &str) -> Result<Option<VersionedValue>, LedgerError> {
        let row = sqlx::query("SELECT value, version FROM world_state WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        row.as_ref().map(Self::map_row_to_versioned).transpose()
    }

    async fn get_state_by_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, VersionedValue)>, LedgerError> {
        // TEXT keys compare bytewise under SQLite's default BINARY collation,
        // which matches the memory adapter's ordering.
        let fetched = if end.is_empty() {
            sqlx::query(
                "SELECT key, value, version FROM world_state WHERE key >= ? ORDER BY key ASC",
            )
            .bind(start)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query(
                "SELECT key, value, version FROM world_state WHERE key >= ? AND key < ? ORDER BY key ASC",
            )
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
        };
        let rows = fetched.map_err(storage)?;

        rows.iter()
            .map(|row| {
                let key: String = row.try_get("key").map_err(decode)?;
                Ok((key, Self::map_row_to_versioned(row)?))
            })
            .collect()
    }

    async fn get_history_for_key(
        &self,
        key: &str,
    ) -> Result<Vec<KeyModification>, LedgerError> {
        let rows = sqlx::query(
            r#"
            SELECT tx_id, value, is_delete, timestamp
            FROM history
            WHERE key = ?
            ORDER BY seq ASC
            "#,
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.into_iter().map(Self::map_row_to_modification).collect()
    }

    async fn commit(&self, header: &TxHeader, rwset: &RwSet) -> Result<Version, LedgerError> {
        // Serialize committers so the validate-then-write window cannot interleave.
        let _guard = self.commit_lock.lock().await;
        let mut tx = self.pool.begin().await.map_err(storage)?;

        for (key, read_version) in &rwset.reads {
            let current: Option<i64> =
                sqlx::query_scalar("SELECT version FROM world_state WHERE key = ?")
                    .bind(key)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(storage)?;

            if current.map(|v| v as Version) != *read_version {
                // Dropping `tx` rolls back.
                return Err(LedgerError::MvccConflict(key.clone()));
            }
        }

        let height: i64 = sqlx::query_scalar(
            "UPDATE chain_info SET height = height + 1 WHERE id = 0 RETURNING height",
        )
        .fetch_one(&mut *tx)
        .await
        .map_err(storage)?;

        let timestamp = header.timestamp.to_rfc3339();

        for (key, write) in &rwset.writes {
            match write {
                Some(value) => {
                    sqlx::query(
                        r#"
                        INSERT INTO world_state (key, value, version)
                        VALUES (?, ?, ?)
                        ON CONFLICT(key) DO UPDATE SET
                            value = excluded.value,
                            version = excluded.version
                        "#,
                    )
                    .bind(key)
                    .bind(value.as_slice())
                    .bind(height)
                    .execute(&mut *tx)
                    .await
                    .map_err(storage)?;
                }
                None => {
                    sqlx::query("DELETE FROM world_state WHERE key = ?")
                        .bind(key)
                        .execute(&mut *tx)
                        .await
                        .map_err(storage)?;
                }
            }

            let history_value: &[u8] = write.as_deref().unwrap_or_default();
            sqlx::query(
                r#"
                INSERT INTO history (key, tx_id, value, is_delete, timestamp)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(key)
            .bind(&header.tx_id)
            .bind(history_value)
            .bind(write.is_none())
            .bind(&timestamp)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        }

        tx.commit().await.map_err(storage)?;

        Ok(height as Version)
    }

    async fn height(&self) -> Result<Version, LedgerError> {
        let height: i64 = sqlx::query_scalar("SELECT height FROM chain_info WHERE id = 0")
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;
        Ok(height as Version)
    }
}
