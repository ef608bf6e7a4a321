use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use hearth::{ChatHub, Config, Database, JwtVerifier, WebServer};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    // Initialize logging
    if let Err(e) = hearth::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        hearth::logging::init_console_only(&config.logging.level);
    }

    info!("hearth - realtime chat server");

    let db = match Database::open(&config.database.path).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to open database: {e}");
            return ExitCode::FAILURE;
        }
    };

    let verifier = Arc::new(JwtVerifier::new(&config.auth.jwt_secret));
    let hub = Arc::new(ChatHub::new(
        db.pool().clone(),
        config.chat.rooms.clone(),
        verifier,
    ));

    let server = WebServer::new(&config.server, db, hub);
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    if let Err(e) = server.run().await {
        error!("Server error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
