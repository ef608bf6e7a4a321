//! hearth - realtime chat server
//!
//! A chat service core over persistent WebSocket connections: token
//! authentication, online presence, single-room membership with history
//! replay, room broadcast and direct messages, and typing relay.

pub mod auth;
pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use auth::{Claims, JwtVerifier, TokenVerifier};
pub use chat::{
    ChatHub, ClientEvent, ConnId, HistoryLoader, PresenceRegistry, RoomRegistry, ServerEvent,
    Session, REPLAY_LIMIT,
};
pub use config::Config;
pub use db::{
    Database, NewPrivateMessage, NewRoomMessage, PrivateMessage, PrivateMessageRepository,
    RoomMessage, RoomMessageRepository, UserRepository,
};
pub use error::{HearthError, Result};
pub use web::WebServer;
