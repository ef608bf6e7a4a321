//! Presence registry.
//!
//! Tracks which identities are online and through which connections.
//! An identity with no connections is removed entirely, so key absence
//! means offline.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use super::session::ConnId;

/// Mapping from identity to its set of live connections.
///
/// Shared across all connection tasks; mutations are serialized behind
/// the write lock.
#[derive(Default)]
pub struct PresenceRegistry {
    online: RwLock<HashMap<String, HashSet<ConnId>>>,
}

impl PresenceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection under an identity.
    ///
    /// The identity's set is created if absent.
    pub async fn add_session(&self, identity: &str, conn_id: ConnId) {
        let mut online = self.online.write().await;
        online.entry(identity.to_string()).or_default().insert(conn_id);
    }

    /// Remove a connection from an identity.
    ///
    /// The identity entry is deleted entirely when its last connection
    /// goes away.
    pub async fn remove_session(&self, identity: &str, conn_id: ConnId) {
        let mut online = self.online.write().await;
        if let Some(connections) = online.get_mut(identity) {
            connections.remove(&conn_id);
            if connections.is_empty() {
                online.remove(identity);
            }
        }
    }

    /// List all online identities, sorted ascending.
    pub async fn list_identities(&self) -> Vec<String> {
        let online = self.online.read().await;
        let mut identities: Vec<String> = online.keys().cloned().collect();
        identities.sort();
        identities
    }

    /// Resolve an identity to one of its live connections.
    ///
    /// Which connection is returned for an identity with several live
    /// connections is arbitrary.
    pub async fn any_connection_for(&self, identity: &str) -> Option<ConnId> {
        let online = self.online.read().await;
        online
            .get(identity)
            .and_then(|connections| connections.iter().next().copied())
    }

    /// Whether an identity has at least one live connection.
    pub async fn is_online(&self, identity: &str) -> bool {
        self.online.read().await.contains_key(identity)
    }

    /// Number of live connections for an identity.
    pub async fn connection_count(&self, identity: &str) -> usize {
        self.online
            .read()
            .await
            .get(identity)
            .map(|connections| connections.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_and_list() {
        let registry = PresenceRegistry::new();
        registry.add_session("bob", ConnId::new()).await;
        registry.add_session("alice", ConnId::new()).await;

        // Sorted ascending
        assert_eq!(registry.list_identities().await, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_absence_means_offline() {
        let registry = PresenceRegistry::new();
        let conn = ConnId::new();

        registry.add_session("alice", conn).await;
        assert!(registry.is_online("alice").await);

        registry.remove_session("alice", conn).await;
        assert!(!registry.is_online("alice").await);
        assert!(registry.list_identities().await.is_empty());
    }

    #[tokio::test]
    async fn test_no_empty_set_retained() {
        let registry = PresenceRegistry::new();
        let conn = ConnId::new();

        registry.add_session("alice", conn).await;
        registry.remove_session("alice", conn).await;

        // The key must be gone, not present with an empty set
        assert_eq!(registry.connection_count("alice").await, 0);
        assert!(registry.any_connection_for("alice").await.is_none());
    }

    #[tokio::test]
    async fn test_multiple_connections_per_identity() {
        let registry = PresenceRegistry::new();
        let first = ConnId::new();
        let second = ConnId::new();

        registry.add_session("alice", first).await;
        registry.add_session("alice", second).await;

        assert_eq!(registry.connection_count("alice").await, 2);
        assert_eq!(registry.list_identities().await, vec!["alice"]);

        // Still online after one connection drops
        registry.remove_session("alice", first).await;
        assert!(registry.is_online("alice").await);
        assert_eq!(registry.any_connection_for("alice").await, Some(second));

        registry.remove_session("alice", second).await;
        assert!(!registry.is_online("alice").await);
    }

    #[tokio::test]
    async fn test_any_connection_for_returns_live_connection() {
        let registry = PresenceRegistry::new();
        let first = ConnId::new();
        let second = ConnId::new();

        registry.add_session("alice", first).await;
        registry.add_session("alice", second).await;

        let resolved = registry.any_connection_for("alice").await.unwrap();
        assert!(resolved == first || resolved == second);
    }

    #[tokio::test]
    async fn test_any_connection_for_unknown_identity() {
        let registry = PresenceRegistry::new();
        assert!(registry.any_connection_for("nobody").await.is_none());
    }

    #[tokio::test]
    async fn test_remove_unknown_is_noop() {
        let registry = PresenceRegistry::new();
        registry.remove_session("ghost", ConnId::new()).await;
        assert!(registry.list_identities().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_wrong_connection_keeps_identity() {
        let registry = PresenceRegistry::new();
        let conn = ConnId::new();

        registry.add_session("alice", conn).await;
        registry.remove_session("alice", ConnId::new()).await;

        assert!(registry.is_online("alice").await);
    }
}
