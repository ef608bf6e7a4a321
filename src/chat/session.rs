//! Per-connection session state.

use std::fmt;

use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use super::protocol::ServerEvent;

/// Identifier for one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(Uuid);

impl ConnId {
    /// Create a fresh connection ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-side state bound to one live connection.
///
/// Created on connect and destroyed on disconnect. The identity is set
/// only by a successful auth event; the room only by join/leave
/// transitions. An unauthenticated session has no identity and its room
/// and message events are not honored.
#[derive(Debug)]
pub struct Session {
    sender: UnboundedSender<ServerEvent>,
    /// Authenticated username, if any.
    pub identity: Option<String>,
    /// Currently joined room, if any.
    pub room: Option<String>,
}

impl Session {
    /// Create a new unauthenticated session around the connection's
    /// outbound channel.
    pub fn new(sender: UnboundedSender<ServerEvent>) -> Self {
        Self {
            sender,
            identity: None,
            room: None,
        }
    }

    /// Whether the session has been bound to an identity.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Queue an event for delivery to this connection.
    ///
    /// Delivery to a connection that is going away is best-effort; the
    /// send result is ignored.
    pub fn send(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}
