//! Realtime messaging core for hearth.
//!
//! This module owns the chat state machine and fan-out logic:
//! - Per-connection sessions bound to an identity after authentication
//! - Presence tracking across multiple connections per identity
//! - Single-room membership with join/leave notifications
//! - Room broadcast and direct message routing
//! - Ephemeral typing relay
//! - History replay on room join

pub mod history;
pub mod hub;
pub mod presence;
pub mod protocol;
pub mod rooms;
pub mod session;

pub use history::{HistoryLoader, REPLAY_LIMIT};
pub use hub::ChatHub;
pub use presence::PresenceRegistry;
pub use protocol::{ClientEvent, PrivateMessageInfo, RoomMessageInfo, ServerEvent};
pub use rooms::RoomRegistry;
pub use session::{ConnId, Session};
