//! Room catalog and membership.
//!
//! Rooms come from a fixed catalog configured at startup; they are not
//! created or deleted at runtime. A connection belongs to at most one
//! room at a time, which is enforced by the hub's join/leave transitions.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use super::session::ConnId;

/// Room catalog plus per-room membership.
pub struct RoomRegistry {
    catalog: Vec<String>,
    members: RwLock<HashMap<String, HashSet<ConnId>>>,
}

impl RoomRegistry {
    /// Create a registry over the given room catalog.
    pub fn new(catalog: Vec<String>) -> Self {
        Self {
            catalog,
            members: RwLock::new(HashMap::new()),
        }
    }

    /// The configured room catalog, in announcement order.
    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    /// Whether the room is part of the catalog.
    pub fn is_known(&self, room: &str) -> bool {
        self.catalog.iter().any(|r| r.as_str() == room)
    }

    /// Add a connection to a room's member set.
    pub async fn add_member(&self, room: &str, conn_id: ConnId) {
        let mut members = self.members.write().await;
        members.entry(room.to_string()).or_default().insert(conn_id);
    }

    /// Remove a connection from a room's member set.
    ///
    /// Returns true if the connection was a member. Empty member sets are
    /// dropped.
    pub async fn remove_member(&self, room: &str, conn_id: ConnId) -> bool {
        let mut members = self.members.write().await;
        if let Some(room_members) = members.get_mut(room) {
            let removed = room_members.remove(&conn_id);
            if room_members.is_empty() {
                members.remove(room);
            }
            removed
        } else {
            false
        }
    }

    /// Current members of a room.
    pub async fn members_of(&self, room: &str) -> Vec<ConnId> {
        self.members
            .read()
            .await
            .get(room)
            .map(|room_members| room_members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether a connection is currently in the room.
    pub async fn is_member(&self, room: &str, conn_id: ConnId) -> bool {
        self.members
            .read()
            .await
            .get(room)
            .is_some_and(|room_members| room_members.contains(&conn_id))
    }
}
