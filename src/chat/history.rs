//! Room history replay.

use sqlx::SqlitePool;

use crate::db::{RoomMessage, RoomMessageRepository};
use crate::Result;

/// Number of messages replayed to a session when it joins a room.
pub const REPLAY_LIMIT: i64 = 50;

/// Loads recent room history for replay on join.
pub struct HistoryLoader {
    pool: SqlitePool,
}

impl HistoryLoader {
    /// Create a loader over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Most recent messages for a room, oldest first.
    ///
    /// The store answers "most recent N" queries efficiently, so this
    /// fetches newest-first and reverses for display order.
    pub async fn recent(&self, room: &str) -> Result<Vec<RoomMessage>> {
        let mut messages = RoomMessageRepository::new(&self.pool)
            .recent_by_room(room, REPLAY_LIMIT)
            .await?;
        messages.reverse();
        Ok(messages)
    }
}
