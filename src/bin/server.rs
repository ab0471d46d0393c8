//! Restaurant API Server
//!
//! Serves the food and order API from an SQLite document store.
//!
//! # Configuration
//!
//! Environment variables (override the config file):
//! - `RESTAURANT_PORT`: Port to listen on (default: 2500)
//! - `RESTAURANT_DATABASE_PATH`: SQLite database file (default: ~/.local/share/restaurant/restaurant.db)
//! - `RESTAURANT_TOKEN_SECRET`: Secret for signing session tokens
//! - `RESTAURANT_ENV`: Set to `production` for cross-site `Secure` cookies
//! - `RESTAURANT_CONFIG`: Path to config file (default: ~/.config/restaurant/config.yaml)
//!
//! # Config File Format
//!
//! ```yaml
//! port: 2500
//! database_path: /var/lib/restaurant/restaurant.db
//! token_secret: "change-me"
//! production: true
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use restaurant::config::Config;
use restaurant::db::init_db;
use restaurant::server::{router, AppState, CookiePolicy, TokenService};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "restaurant=info,restaurant_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("RESTAURANT_CONFIG").ok().map(PathBuf::from);
    let config = Config::load(config_path)?;

    tracing::info!("Database: {}", config.database_path.display());
    let pool = init_db(&config.database_path).await?;

    let tokens = match &config.token_secret {
        Some(secret) => TokenService::new(secret.as_bytes())?,
        None => {
            tracing::warn!(
                "RESTAURANT_TOKEN_SECRET not set - using a random secret, sessions end on restart"
            );
            TokenService::with_random_secret()?
        }
    };

    if config.production {
        tracing::info!("Production mode: session cookies are Secure; SameSite=None");
    }

    let state = AppState::new(pool, tokens, CookiePolicy::new(config.production));
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Restaurant server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
