//! Web module for hearth.
//!
//! Hosts the WebSocket chat endpoint and the small REST surface
//! (health check and user directory) next to it.

pub mod error;
pub mod router;
pub mod server;
pub mod ws;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;

use std::sync::Arc;

use crate::chat::ChatHub;
use crate::Database;

/// Shared application state for the web layer.
pub struct AppState {
    /// Database handle for the REST API.
    pub db: Arc<Database>,
    /// Chat hub shared by all WebSocket connections.
    pub hub: Arc<ChatHub>,
}
