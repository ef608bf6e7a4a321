//! Central dispatcher for realtime chat events.
//!
//! A single `ChatHub` is shared by every connection task. It owns the
//! session table, the presence registry and the room membership map, and
//! implements the event semantics: authentication, room join/leave,
//! room and private message routing, and typing relay.
//!
//! Malformed or unauthorized events are dropped without a reply; only a
//! failed auth attempt is answered, and only on the offending connection.

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::auth::TokenVerifier;
use crate::db::{
    NewPrivateMessage, NewRoomMessage, PrivateMessageRepository, RoomMessageRepository,
};

use super::history::HistoryLoader;
use super::presence::PresenceRegistry;
use super::protocol::{ClientEvent, PrivateMessageInfo, RoomMessageInfo, ServerEvent};
use super::rooms::RoomRegistry;
use super::session::{ConnId, Session};

/// Message sent to a connection when its token fails verification.
const AUTH_ERROR_TEXT: &str = "Invalid token. Please login again.";

/// Shared state and event handling for all chat connections.
pub struct ChatHub {
    sessions: RwLock<HashMap<ConnId, Session>>,
    presence: PresenceRegistry,
    rooms: RoomRegistry,
    history: HistoryLoader,
    verifier: Arc<dyn TokenVerifier>,
    pool: SqlitePool,
}

impl ChatHub {
    /// Create a hub over the given store, room catalog and token verifier.
    pub fn new(pool: SqlitePool, catalog: Vec<String>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            presence: PresenceRegistry::new(),
            rooms: RoomRegistry::new(catalog),
            history: HistoryLoader::new(pool.clone()),
            verifier,
            pool,
        }
    }

    /// Register a new connection.
    ///
    /// The connection stays inert until a successful auth event binds it
    /// to an identity.
    pub async fn connect(&self, conn_id: ConnId, sender: UnboundedSender<ServerEvent>) {
        self.sessions.write().await.insert(conn_id, Session::new(sender));
        debug!(conn = %conn_id, "connection registered");
    }

    /// Dispatch a client event to its handler.
    pub async fn handle_event(&self, conn_id: ConnId, event: ClientEvent) {
        match event {
            ClientEvent::Auth { token } => self.authenticate(conn_id, &token).await,
            ClientEvent::JoinRoom { room } => self.join_room(conn_id, &room).await,
            ClientEvent::LeaveRoom { room } => self.leave_room(conn_id, room.as_deref()).await,
            ClientEvent::RoomMessage { room, text } => {
                self.room_message(conn_id, &room, &text).await
            }
            ClientEvent::PrivateMessage { to, text } => {
                self.private_message(conn_id, &to, &text).await
            }
            ClientEvent::Typing { to, is_typing } => self.typing(conn_id, &to, is_typing).await,
        }
    }

    /// Authenticate a connection with a login token.
    ///
    /// On success the session is bound to the identity, registered in the
    /// presence registry, sent the room catalog, and a fresh online-users
    /// snapshot goes out to everyone. On failure only the offending
    /// connection hears about it, and the connection stays open.
    pub async fn authenticate(&self, conn_id: ConnId, token: &str) {
        let Some(identity) = self.verifier.verify(token) else {
            self.send_to(
                conn_id,
                ServerEvent::AuthError {
                    message: AUTH_ERROR_TEXT.to_string(),
                },
            )
            .await;
            return;
        };

        let previous = {
            let mut sessions = self.sessions.write().await;
            let Some(session) = sessions.get_mut(&conn_id) else {
                return;
            };
            session.identity.replace(identity.clone())
        };

        // Re-authentication re-binds the session under the new identity.
        if let Some(previous) = previous {
            self.presence.remove_session(&previous, conn_id).await;
        }
        self.presence.add_session(&identity, conn_id).await;

        self.send_to(conn_id, ServerEvent::Rooms(self.rooms.catalog().to_vec()))
            .await;
        self.broadcast_presence().await;

        info!(identity = %identity, conn = %conn_id, "client authenticated");
    }

    /// Join a room, switching out of the current one if any.
    ///
    /// The joining session alone receives the recent history replay;
    /// everyone already in the room gets a system notice. Switching rooms
    /// drops the old membership without a departure notice.
    pub async fn join_room(&self, conn_id: ConnId, room: &str) {
        if room.is_empty() || !self.rooms.is_known(room) {
            return;
        }

        let (identity, previous) = {
            let mut sessions = self.sessions.write().await;
            let Some(session) = sessions.get_mut(&conn_id) else {
                return;
            };
            let Some(identity) = session.identity.clone() else {
                return;
            };
            let previous = session.room.replace(room.to_string());
            (identity, previous)
        };

        if let Some(previous) = previous {
            self.rooms.remove_member(&previous, conn_id).await;
        }
        self.rooms.add_member(room, conn_id).await;

        match self.history.recent(room).await {
            Ok(messages) => {
                let replay = messages.into_iter().map(RoomMessageInfo::from).collect();
                self.send_to(conn_id, ServerEvent::RoomHistory(replay)).await;
            }
            Err(e) => {
                warn!(room = %room, error = %e, "failed to load room history");
                return;
            }
        }

        self.notify_room(
            room,
            ServerEvent::System {
                text: format!("{identity} joined {room}"),
            },
            Some(conn_id),
        )
        .await;
    }

    /// Leave a room, defaulting to the session's current one.
    ///
    /// Remaining members get a system notice. Naming a room the session is
    /// not in is a no-op.
    pub async fn leave_room(&self, conn_id: ConnId, room: Option<&str>) {
        let (identity, target) = {
            let mut sessions = self.sessions.write().await;
            let Some(session) = sessions.get_mut(&conn_id) else {
                return;
            };
            let Some(identity) = session.identity.clone() else {
                return;
            };
            let target = match room.filter(|r| !r.is_empty()) {
                Some(r) => r.to_string(),
                None => match session.room.clone() {
                    Some(r) => r,
                    None => return,
                },
            };
            if session.room.as_deref() == Some(target.as_str()) {
                session.room = None;
            }
            (identity, target)
        };

        if !self.rooms.remove_member(&target, conn_id).await {
            return;
        }

        self.notify_room(
            &target,
            ServerEvent::System {
                text: format!("{identity} left {target}"),
            },
            Some(conn_id),
        )
        .await;
    }

    /// Route a message to a room.
    ///
    /// The message is persisted first; the stored record, timestamp
    /// included, then fans out to every current member of the room,
    /// the sender among them.
    pub async fn room_message(&self, conn_id: ConnId, room: &str, text: &str) {
        let trimmed = text.trim();
        if room.is_empty() || trimmed.is_empty() {
            return;
        }
        let Some(identity) = self.identity_of(conn_id).await else {
            return;
        };

        let new_message = NewRoomMessage::new(room, &identity, trimmed);
        let message = match RoomMessageRepository::new(&self.pool).create(&new_message).await {
            Ok(message) => message,
            Err(e) => {
                warn!(room = %room, error = %e, "failed to persist room message");
                return;
            }
        };

        self.notify_room(room, ServerEvent::RoomMessage(message.into()), None)
            .await;
    }

    /// Route a direct message to a user.
    ///
    /// The stored record is always echoed back to the sender. If the
    /// recipient is online it is also delivered to one of their
    /// connections; otherwise it stays stored for later reads.
    pub async fn private_message(&self, conn_id: ConnId, to: &str, text: &str) {
        let trimmed = text.trim();
        if to.is_empty() || trimmed.is_empty() {
            return;
        }
        let Some(identity) = self.identity_of(conn_id).await else {
            return;
        };

        let new_message = NewPrivateMessage::new(&identity, to, trimmed);
        let message = match PrivateMessageRepository::new(&self.pool)
            .create(&new_message)
            .await
        {
            Ok(message) => message,
            Err(e) => {
                warn!(recipient = %to, error = %e, "failed to persist private message");
                return;
            }
        };

        let info = PrivateMessageInfo::from(message);
        self.send_to(conn_id, ServerEvent::PrivateMessage(info.clone()))
            .await;

        if let Some(target) = self.presence.any_connection_for(to).await {
            self.send_to(target, ServerEvent::PrivateMessage(info)).await;
        }
    }

    /// Relay a typing signal to one connection of the recipient.
    ///
    /// Nothing is persisted; an offline recipient means a no-op.
    pub async fn typing(&self, conn_id: ConnId, to: &str, is_typing: bool) {
        if to.is_empty() {
            return;
        }
        let Some(identity) = self.identity_of(conn_id).await else {
            return;
        };

        if let Some(target) = self.presence.any_connection_for(to).await {
            self.send_to(
                target,
                ServerEvent::Typing {
                    sender: identity,
                    is_typing,
                },
            )
            .await;
        }
    }

    /// Tear down a connection.
    ///
    /// Room membership is dropped without a system notice; if the session
    /// was authenticated its presence entry goes away and everyone gets a
    /// fresh online-users snapshot.
    pub async fn disconnect(&self, conn_id: ConnId) {
        let Some(session) = self.sessions.write().await.remove(&conn_id) else {
            return;
        };

        if let Some(room) = &session.room {
            self.rooms.remove_member(room, conn_id).await;
        }

        if let Some(identity) = &session.identity {
            self.presence.remove_session(identity, conn_id).await;
            self.broadcast_presence().await;
            info!(identity = %identity, conn = %conn_id, "client disconnected");
        } else {
            debug!(conn = %conn_id, "connection closed");
        }
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// The presence registry.
    pub fn presence(&self) -> &PresenceRegistry {
        &self.presence
    }

    /// The room registry.
    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    async fn identity_of(&self, conn_id: ConnId) -> Option<String> {
        self.sessions
            .read()
            .await
            .get(&conn_id)
            .and_then(|session| session.identity.clone())
    }

    async fn send_to(&self, conn_id: ConnId, event: ServerEvent) {
        if let Some(session) = self.sessions.read().await.get(&conn_id) {
            session.send(event);
        }
    }

    async fn notify_room(&self, room: &str, event: ServerEvent, except: Option<ConnId>) {
        let members = self.rooms.members_of(room).await;
        let sessions = self.sessions.read().await;
        for member in members {
            if Some(member) == except {
                continue;
            }
            if let Some(session) = sessions.get(&member) {
                session.send(event.clone());
            }
        }
    }

    /// Recompute the online snapshot and push it to every connection.
    async fn broadcast_presence(&self) {
        let online = self.presence.list_identities().await;
        let sessions = self.sessions.read().await;
        for session in sessions.values() {
            session.send(ServerEvent::OnlineUsers(online.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    /// Verifier that accepts tokens of the form `token-<username>`.
    struct StubVerifier;

    impl TokenVerifier for StubVerifier {
        fn verify(&self, token: &str) -> Option<String> {
            token.strip_prefix("token-").map(str::to_string)
        }
    }

    struct TestClient {
        conn_id: ConnId,
        rx: UnboundedReceiver<ServerEvent>,
    }

    impl TestClient {
        async fn connect(hub: &ChatHub) -> Self {
            let conn_id = ConnId::new();
            let (tx, rx) = mpsc::unbounded_channel();
            hub.connect(conn_id, tx).await;
            Self { conn_id, rx }
        }

        async fn authenticate(hub: &ChatHub, name: &str) -> Self {
            let mut client = Self::connect(hub).await;
            hub.authenticate(client.conn_id, &format!("token-{name}")).await;
            client.drain();
            client
        }

        fn next(&mut self) -> ServerEvent {
            self.rx.try_recv().expect("expected a pending event")
        }

        fn drain(&mut self) -> Vec<ServerEvent> {
            let mut events = Vec::new();
            while let Ok(event) = self.rx.try_recv() {
                events.push(event);
            }
            events
        }

        fn assert_empty(&mut self) {
            assert!(self.rx.try_recv().is_err(), "expected no pending events");
        }
    }

    async fn test_hub() -> (ChatHub, Database) {
        let db = Database::open_in_memory().await.unwrap();
        let hub = ChatHub::new(
            db.pool().clone(),
            vec!["devops".to_string(), "sports".to_string()],
            Arc::new(StubVerifier),
        );
        (hub, db)
    }

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let (hub, _db) = test_hub().await;

        let client = TestClient::connect(&hub).await;
        assert_eq!(hub.session_count().await, 1);

        hub.disconnect(client.conn_id).await;
        assert_eq!(hub.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let (hub, _db) = test_hub().await;
        let mut client = TestClient::connect(&hub).await;

        hub.authenticate(client.conn_id, "token-alice").await;

        match client.next() {
            ServerEvent::Rooms(rooms) => assert_eq!(rooms, vec!["devops", "sports"]),
            other => panic!("expected rooms, got {other:?}"),
        }
        match client.next() {
            ServerEvent::OnlineUsers(users) => assert_eq!(users, vec!["alice"]),
            other => panic!("expected onlineUsers, got {other:?}"),
        }
        assert!(hub.presence().is_online("alice").await);
    }

    #[tokio::test]
    async fn test_authenticate_bad_token() {
        let (hub, _db) = test_hub().await;
        let mut client = TestClient::connect(&hub).await;

        hub.authenticate(client.conn_id, "garbage").await;

        match client.next() {
            ServerEvent::AuthError { message } => {
                assert_eq!(message, "Invalid token. Please login again.")
            }
            other => panic!("expected authError, got {other:?}"),
        }
        client.assert_empty();
        assert!(hub.presence().list_identities().await.is_empty());
    }

    #[tokio::test]
    async fn test_auth_error_only_reaches_offender() {
        let (hub, _db) = test_hub().await;
        let mut alice = TestClient::authenticate(&hub, "alice").await;
        let mut intruder = TestClient::connect(&hub).await;

        hub.authenticate(intruder.conn_id, "bad").await;

        assert!(matches!(intruder.next(), ServerEvent::AuthError { .. }));
        alice.assert_empty();
    }

    #[tokio::test]
    async fn test_presence_broadcast_reaches_all_connections() {
        let (hub, _db) = test_hub().await;
        let mut alice = TestClient::authenticate(&hub, "alice").await;
        let mut unauthenticated = TestClient::connect(&hub).await;
        let mut bob = TestClient::connect(&hub).await;

        hub.authenticate(bob.conn_id, "token-bob").await;

        // Everyone, authenticated or not, gets the new snapshot
        match alice.next() {
            ServerEvent::OnlineUsers(users) => assert_eq!(users, vec!["alice", "bob"]),
            other => panic!("expected onlineUsers, got {other:?}"),
        }
        match unauthenticated.next() {
            ServerEvent::OnlineUsers(users) => assert_eq!(users, vec!["alice", "bob"]),
            other => panic!("expected onlineUsers, got {other:?}"),
        }
        bob.drain();
    }

    #[tokio::test]
    async fn test_reauthentication_rebinds_identity() {
        let (hub, _db) = test_hub().await;
        let mut client = TestClient::connect(&hub).await;

        hub.authenticate(client.conn_id, "token-alice").await;
        hub.authenticate(client.conn_id, "token-alicia").await;
        client.drain();

        assert!(!hub.presence().is_online("alice").await);
        assert!(hub.presence().is_online("alicia").await);
    }

    #[tokio::test]
    async fn test_join_room_replays_history_and_notifies_others() {
        let (hub, db) = test_hub().await;
        RoomMessageRepository::new(db.pool())
            .create(&NewRoomMessage::new("devops", "carol", "earlier"))
            .await
            .unwrap();

        let mut alice = TestClient::authenticate(&hub, "alice").await;
        hub.join_room(alice.conn_id, "devops").await;

        let mut bob = TestClient::authenticate(&hub, "bob").await;
        alice.drain();
        hub.join_room(bob.conn_id, "devops").await;

        // The joiner gets history only
        match bob.next() {
            ServerEvent::RoomHistory(messages) => {
                assert_eq!(messages.len(), 1);
                assert_eq!(messages[0].text, "earlier");
            }
            other => panic!("expected roomHistory, got {other:?}"),
        }
        bob.assert_empty();

        // The member already present gets the system notice only
        match alice.next() {
            ServerEvent::System { text } => assert_eq!(text, "bob joined devops"),
            other => panic!("expected system, got {other:?}"),
        }
        alice.assert_empty();
    }

    #[tokio::test]
    async fn test_join_requires_authentication() {
        let (hub, _db) = test_hub().await;
        let mut client = TestClient::connect(&hub).await;

        hub.join_room(client.conn_id, "devops").await;

        client.assert_empty();
        assert!(hub.rooms().members_of("devops").await.is_empty());
    }

    #[tokio::test]
    async fn test_join_unknown_room_is_dropped() {
        let (hub, _db) = test_hub().await;
        let mut alice = TestClient::authenticate(&hub, "alice").await;

        hub.join_room(alice.conn_id, "backchannel").await;
        hub.join_room(alice.conn_id, "").await;

        alice.assert_empty();
    }

    #[tokio::test]
    async fn test_switching_rooms_leaves_previous() {
        let (hub, _db) = test_hub().await;
        let mut alice = TestClient::authenticate(&hub, "alice").await;

        hub.join_room(alice.conn_id, "devops").await;
        hub.join_room(alice.conn_id, "sports").await;
        alice.drain();

        // Never a member of both
        assert!(!hub.rooms().is_member("devops", alice.conn_id).await);
        assert!(hub.rooms().is_member("sports", alice.conn_id).await);
    }

    #[tokio::test]
    async fn test_switching_rooms_is_silent_in_old_room() {
        let (hub, _db) = test_hub().await;
        let mut alice = TestClient::authenticate(&hub, "alice").await;
        let mut bob = TestClient::authenticate(&hub, "bob").await;

        hub.join_room(alice.conn_id, "devops").await;
        hub.join_room(bob.conn_id, "devops").await;
        alice.drain();
        bob.drain();

        hub.join_room(bob.conn_id, "sports").await;
        bob.drain();

        // No departure notice on a switch
        alice.assert_empty();
    }

    #[tokio::test]
    async fn test_leave_room_notifies_remaining() {
        let (hub, _db) = test_hub().await;
        let mut alice = TestClient::authenticate(&hub, "alice").await;
        let mut bob = TestClient::authenticate(&hub, "bob").await;

        hub.join_room(alice.conn_id, "devops").await;
        hub.join_room(bob.conn_id, "devops").await;
        alice.drain();
        bob.drain();

        hub.leave_room(bob.conn_id, None).await;

        match alice.next() {
            ServerEvent::System { text } => assert_eq!(text, "bob left devops"),
            other => panic!("expected system, got {other:?}"),
        }
        bob.assert_empty();
        assert!(!hub.rooms().is_member("devops", bob.conn_id).await);
    }

    #[tokio::test]
    async fn test_leave_without_room_is_noop() {
        let (hub, _db) = test_hub().await;
        let mut alice = TestClient::authenticate(&hub, "alice").await;

        hub.leave_room(alice.conn_id, None).await;

        alice.assert_empty();
    }

    #[tokio::test]
    async fn test_leave_room_not_joined_is_noop() {
        let (hub, _db) = test_hub().await;
        let mut alice = TestClient::authenticate(&hub, "alice").await;
        let mut bob = TestClient::authenticate(&hub, "bob").await;

        hub.join_room(alice.conn_id, "devops").await;
        alice.drain();

        // Bob never joined devops; nobody should hear a departure
        hub.leave_room(bob.conn_id, Some("devops")).await;

        alice.assert_empty();
        bob.assert_empty();
    }

    #[tokio::test]
    async fn test_room_message_reaches_all_members() {
        let (hub, _db) = test_hub().await;
        let mut alice = TestClient::authenticate(&hub, "alice").await;
        let mut bob = TestClient::authenticate(&hub, "bob").await;

        hub.join_room(alice.conn_id, "devops").await;
        hub.join_room(bob.conn_id, "devops").await;
        alice.drain();
        bob.drain();

        hub.room_message(alice.conn_id, "devops", "hi").await;

        for client in [&mut alice, &mut bob] {
            match client.next() {
                ServerEvent::RoomMessage(info) => {
                    assert_eq!(info.room, "devops");
                    assert_eq!(info.sender, "alice");
                    assert_eq!(info.text, "hi");
                }
                other => panic!("expected roomMessage, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_room_message_trims_text() {
        let (hub, _db) = test_hub().await;
        let mut alice = TestClient::authenticate(&hub, "alice").await;
        hub.join_room(alice.conn_id, "devops").await;
        alice.drain();

        hub.room_message(alice.conn_id, "devops", "  padded  ").await;

        match alice.next() {
            ServerEvent::RoomMessage(info) => assert_eq!(info.text, "padded"),
            other => panic!("expected roomMessage, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_room_message_unauthenticated_not_persisted() {
        let (hub, db) = test_hub().await;
        let mut intruder = TestClient::connect(&hub).await;
        let mut alice = TestClient::authenticate(&hub, "alice").await;
        hub.join_room(alice.conn_id, "devops").await;
        alice.drain();

        hub.room_message(intruder.conn_id, "devops", "x").await;

        intruder.assert_empty();
        alice.assert_empty();
        let count = RoomMessageRepository::new(db.pool()).count().await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_room_message_blank_text_dropped() {
        let (hub, db) = test_hub().await;
        let mut alice = TestClient::authenticate(&hub, "alice").await;
        hub.join_room(alice.conn_id, "devops").await;
        alice.drain();

        hub.room_message(alice.conn_id, "devops", "   ").await;
        hub.room_message(alice.conn_id, "", "hello").await;

        alice.assert_empty();
        let count = RoomMessageRepository::new(db.pool()).count().await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_private_message_echo_and_delivery() {
        let (hub, _db) = test_hub().await;
        let mut alice = TestClient::authenticate(&hub, "alice").await;
        let mut bob = TestClient::authenticate(&hub, "bob").await;
        alice.drain();

        hub.private_message(bob.conn_id, "alice", "hey").await;

        // Sender echo with stored timestamp
        match bob.next() {
            ServerEvent::PrivateMessage(info) => {
                assert_eq!(info.sender, "bob");
                assert_eq!(info.to, "alice");
                assert_eq!(info.text, "hey");
            }
            other => panic!("expected privateMessage, got {other:?}"),
        }
        // Live delivery to the recipient
        match alice.next() {
            ServerEvent::PrivateMessage(info) => assert_eq!(info.text, "hey"),
            other => panic!("expected privateMessage, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_private_message_offline_recipient_still_persisted() {
        let (hub, db) = test_hub().await;
        let mut bob = TestClient::authenticate(&hub, "bob").await;

        hub.private_message(bob.conn_id, "alice", "hey").await;

        // Echo still arrives
        assert!(matches!(bob.next(), ServerEvent::PrivateMessage(_)));
        bob.assert_empty();

        let count = PrivateMessageRepository::new(db.pool()).count().await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_private_message_single_connection_delivery() {
        let (hub, _db) = test_hub().await;
        let mut first = TestClient::authenticate(&hub, "alice").await;
        let mut second = TestClient::connect(&hub).await;
        hub.authenticate(second.conn_id, "token-alice").await;
        first.drain();
        second.drain();

        let mut bob = TestClient::authenticate(&hub, "bob").await;
        first.drain();
        second.drain();

        hub.private_message(bob.conn_id, "alice", "hey").await;

        let deliveries = first.drain().len() + second.drain().len();
        assert_eq!(deliveries, 1, "exactly one of alice's connections hears it");
    }

    #[tokio::test]
    async fn test_typing_relay() {
        let (hub, _db) = test_hub().await;
        let mut alice = TestClient::authenticate(&hub, "alice").await;
        let mut bob = TestClient::authenticate(&hub, "bob").await;
        alice.drain();

        hub.typing(bob.conn_id, "alice", true).await;

        match alice.next() {
            ServerEvent::Typing { sender, is_typing } => {
                assert_eq!(sender, "bob");
                assert!(is_typing);
            }
            other => panic!("expected typing, got {other:?}"),
        }
        bob.assert_empty();
    }

    #[tokio::test]
    async fn test_typing_offline_recipient_is_noop() {
        let (hub, _db) = test_hub().await;
        let mut bob = TestClient::authenticate(&hub, "bob").await;

        hub.typing(bob.conn_id, "alice", true).await;

        bob.assert_empty();
    }

    #[tokio::test]
    async fn test_typing_unauthenticated_is_dropped() {
        let (hub, _db) = test_hub().await;
        let mut intruder = TestClient::connect(&hub).await;
        let mut alice = TestClient::authenticate(&hub, "alice").await;

        hub.typing(intruder.conn_id, "alice", true).await;

        alice.assert_empty();
        intruder.assert_empty();
    }

    #[tokio::test]
    async fn test_disconnect_updates_presence_and_rooms() {
        let (hub, _db) = test_hub().await;
        let mut alice = TestClient::authenticate(&hub, "alice").await;
        let mut bob = TestClient::authenticate(&hub, "bob").await;

        hub.join_room(bob.conn_id, "devops").await;
        hub.join_room(alice.conn_id, "devops").await;
        alice.drain();
        bob.drain();

        hub.disconnect(bob.conn_id).await;

        assert!(!hub.presence().is_online("bob").await);
        assert!(!hub.rooms().is_member("devops", bob.conn_id).await);

        // A presence snapshot but no departure system message
        let events = alice.drain();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ServerEvent::OnlineUsers(users) => assert_eq!(users, &["alice"]),
            other => panic!("expected onlineUsers, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_disconnect_unauthenticated_is_silent() {
        let (hub, _db) = test_hub().await;
        let mut alice = TestClient::authenticate(&hub, "alice").await;
        let intruder = TestClient::connect(&hub).await;

        hub.disconnect(intruder.conn_id).await;

        alice.assert_empty();
    }

    #[tokio::test]
    async fn test_handle_event_dispatch() {
        let (hub, _db) = test_hub().await;
        let mut client = TestClient::connect(&hub).await;

        hub.handle_event(
            client.conn_id,
            ClientEvent::Auth {
                token: "token-alice".to_string(),
            },
        )
        .await;

        assert!(matches!(client.next(), ServerEvent::Rooms(_)));
        assert!(hub.presence().is_online("alice").await);
    }
}
