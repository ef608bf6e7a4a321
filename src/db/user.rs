//! User repository for hearth.
//!
//! The users table is owned by the account service that handles signup
//! and login; this server reads it to answer the user directory query.

use sqlx::SqlitePool;

use crate::{HearthError, Result};

/// Read-only repository over registered users.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all known usernames, sorted ascending.
    pub async fn list_usernames(&self) -> Result<Vec<String>> {
        let usernames = sqlx::query_scalar::<_, String>(
            "SELECT username FROM users ORDER BY username",
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| HearthError::Database(e.to_string()))?;

        Ok(usernames)
    }
}
