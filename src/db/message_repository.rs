//! Message repositories for hearth.
//!
//! Messages are append-only; the repositories expose create and
//! recent-history queries but no update or delete.

use chrono::Utc;
use sqlx::SqlitePool;

use super::message::{NewPrivateMessage, NewRoomMessage, PrivateMessage, RoomMessage};
use crate::{HearthError, Result};

/// Repository for room message operations.
pub struct RoomMessageRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RoomMessageRepository<'a> {
    /// Create a new RoomMessageRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new room message.
    ///
    /// The creation timestamp is assigned here; the returned record is the
    /// stored row including ID and timestamp.
    pub async fn create(&self, new_message: &NewRoomMessage) -> Result<RoomMessage> {
        let message = sqlx::query_as::<_, RoomMessage>(
            "INSERT INTO room_messages (room, sender, body, created_at)
             VALUES (?, ?, ?, ?)
             RETURNING id, room, sender, body, created_at",
        )
        .bind(&new_message.room)
        .bind(&new_message.sender)
        .bind(&new_message.body)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| HearthError::Database(e.to_string()))?;

        Ok(message)
    }

    /// Most recent messages for a room, newest first.
    pub async fn recent_by_room(&self, room: &str, limit: i64) -> Result<Vec<RoomMessage>> {
        let messages = sqlx::query_as::<_, RoomMessage>(
            "SELECT id, room, sender, body, created_at
             FROM room_messages WHERE room = ?
             ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(room)
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(|e| HearthError::Database(e.to_string()))?;

        Ok(messages)
    }

    /// Count all room messages.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM room_messages")
            .fetch_one(self.pool)
            .await
            .map_err(|e| HearthError::Database(e.to_string()))?;
        Ok(count.0)
    }
}

/// Repository for private message operations.
pub struct PrivateMessageRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PrivateMessageRepository<'a> {
    /// Create a new PrivateMessageRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new private message.
    ///
    /// The message is stored even when the recipient is offline.
    pub async fn create(&self, new_message: &NewPrivateMessage) -> Result<PrivateMessage> {
        let message = sqlx::query_as::<_, PrivateMessage>(
            "INSERT INTO private_messages (sender, recipient, body, created_at)
             VALUES (?, ?, ?, ?)
             RETURNING id, sender, recipient, body, created_at",
        )
        .bind(&new_message.sender)
        .bind(&new_message.recipient)
        .bind(&new_message.body)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| HearthError::Database(e.to_string()))?;

        Ok(message)
    }

    /// Count all private messages.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM private_messages")
            .fetch_one(self.pool)
            .await
            .map_err(|e| HearthError::Database(e.to_string()))?;
        Ok(count.0)
    }
}
