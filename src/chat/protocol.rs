//! Wire protocol events for the chat connection.
//!
//! Events travel as JSON objects of the form
//! `{"event": "...", "data": ...}` in both directions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{PrivateMessage, RoomMessage};

/// Events sent from client to server.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Authenticate the connection with a login token.
    Auth {
        /// Opaque token issued by the login service.
        #[serde(default)]
        token: String,
    },
    /// Join a room, leaving the current one if any.
    JoinRoom {
        /// Room name from the catalog.
        room: String,
    },
    /// Leave a room (the current one when no room is given).
    LeaveRoom {
        /// Room name; defaults to the current room.
        #[serde(default)]
        room: Option<String>,
    },
    /// Send a message to a room.
    RoomMessage {
        /// Target room.
        room: String,
        /// Message text.
        text: String,
    },
    /// Send a direct message to a user.
    PrivateMessage {
        /// Recipient username.
        to: String,
        /// Message text.
        text: String,
    },
    /// Signal typing state to a user.
    Typing {
        /// Recipient username.
        to: String,
        /// Whether the sender is currently typing.
        #[serde(rename = "isTyping")]
        is_typing: bool,
    },
}

/// Events sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Authentication failed; the session stays unauthenticated.
    AuthError {
        /// Human-readable reason.
        message: String,
    },
    /// The room catalog, sent after successful authentication.
    Rooms(Vec<String>),
    /// Snapshot of all online identities, sorted ascending.
    OnlineUsers(Vec<String>),
    /// System text shown in the room (joins and departures).
    System {
        /// Message text.
        text: String,
    },
    /// Recent room history, oldest first, delivered on join.
    RoomHistory(Vec<RoomMessageInfo>),
    /// A room message fan-out.
    RoomMessage(RoomMessageInfo),
    /// A direct message delivery or sender echo.
    PrivateMessage(PrivateMessageInfo),
    /// A typing signal relay.
    Typing {
        /// Username of the typist.
        #[serde(rename = "from")]
        sender: String,
        /// Whether the typist is currently typing.
        #[serde(rename = "isTyping")]
        is_typing: bool,
    },
}

/// Wire form of a stored room message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMessageInfo {
    /// Room the message was posted to.
    pub room: String,
    /// Username of the sender.
    #[serde(rename = "from")]
    pub sender: String,
    /// Message text.
    pub text: String,
    /// Server-assigned timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<RoomMessage> for RoomMessageInfo {
    fn from(message: RoomMessage) -> Self {
        Self {
            room: message.room,
            sender: message.sender,
            text: message.body,
            created_at: message.created_at,
        }
    }
}

/// Wire form of a stored private message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateMessageInfo {
    /// Username of the sender.
    #[serde(rename = "from")]
    pub sender: String,
    /// Username of the recipient.
    pub to: String,
    /// Message text.
    pub text: String,
    /// Server-assigned timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<PrivateMessage> for PrivateMessageInfo {
    fn from(message: PrivateMessage) -> Self {
        Self {
            sender: message.sender,
            to: message.recipient,
            text: message.body,
            created_at: message.created_at,
        }
    }
}
