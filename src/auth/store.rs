//! Token persistence
//!
//! The `tokens` table holds a single row (id 1) that is overwritten on every
//! refresh and never deleted.

use super::types::CachedToken;
use crate::error::{Error, Result};
use crate::store::{from_epoch_millis, to_sql_timestamp, LocalStore};
use duckdb::params;

const TOKEN_ROW_ID: i32 = 1;

const CREATE_TOKENS: &str = "
    CREATE TABLE IF NOT EXISTS tokens (
        id INTEGER PRIMARY KEY,
        token VARCHAR NOT NULL,
        expires_at TIMESTAMP NOT NULL
    );
";

/// Singleton token row in the local store
#[derive(Debug, Clone)]
pub struct TokenStore {
    store: LocalStore,
}

impl TokenStore {
    /// Create a token store on top of the local store
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Create the token table if it does not exist
    pub fn ensure_table(&self) -> Result<()> {
        self.store
            .execute_batch(CREATE_TOKENS)
            .map_err(|e| Error::database(format!("Failed to create token table: {e}")))
    }

    /// Load the cached token, if any
    pub fn load(&self) -> Result<Option<CachedToken>> {
        self.ensure_table()?;
        let conn = self.store.lock();
        let result = conn.query_row(
            "SELECT token, epoch_ms(expires_at) FROM tokens WHERE id = ?",
            params![TOKEN_ROW_ID],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
        );

        match result {
            Ok((token, expires_ms)) => Ok(Some(CachedToken::new(
                token,
                from_epoch_millis(expires_ms)?,
            ))),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::database(format!("Failed to read cached token: {e}"))),
        }
    }

    /// Insert or overwrite the cached token
    pub fn save(&self, token: &CachedToken) -> Result<()> {
        self.ensure_table()?;
        self.store
            .lock()
            .execute(
                "INSERT INTO tokens (id, token, expires_at)
                 VALUES (?, ?, CAST(? AS TIMESTAMP))
                 ON CONFLICT (id) DO UPDATE
                 SET token = excluded.token, expires_at = excluded.expires_at",
                params![
                    TOKEN_ROW_ID,
                    token.token,
                    to_sql_timestamp(token.expires_at)
                ],
            )
            .map_err(|e| Error::database(format!("Failed to save token: {e}")))?;
        Ok(())
    }
}
