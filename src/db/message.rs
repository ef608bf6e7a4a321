//! Message entities for hearth.
//!
//! Room and private messages are write-once: they are created with a
//! server-assigned timestamp and never updated afterwards.

use chrono::{DateTime, Utc};

/// A message posted to a room.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoomMessage {
    /// Message ID.
    pub id: i64,
    /// Room the message was posted to.
    pub room: String,
    /// Username of the sender.
    pub sender: String,
    /// Message body.
    pub body: String,
    /// Server-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// New room message for creation.
#[derive(Debug, Clone)]
pub struct NewRoomMessage {
    /// Room to post to.
    pub room: String,
    /// Username of the sender.
    pub sender: String,
    /// Message body.
    pub body: String,
}

impl NewRoomMessage {
    /// Create a new room message.
    pub fn new(
        room: impl Into<String>,
        sender: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            room: room.into(),
            sender: sender.into(),
            body: body.into(),
        }
    }
}

/// A direct message between two users.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PrivateMessage {
    /// Message ID.
    pub id: i64,
    /// Username of the sender.
    pub sender: String,
    /// Username of the recipient.
    pub recipient: String,
    /// Message body.
    pub body: String,
    /// Server-assigned creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// New private message for creation.
#[derive(Debug, Clone)]
pub struct NewPrivateMessage {
    /// Username of the sender.
    pub sender: String,
    /// Username of the recipient.
    pub recipient: String,
    /// Message body.
    pub body: String,
}

impl NewPrivateMessage {
    /// Create a new private message.
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            body: body.into(),
        }
    }
}
