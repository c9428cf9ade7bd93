mod handlers;
mod server;
mod store;

use std::{env, sync::Arc};

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::handlers::{AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calrss_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Directory of calendar JSON files
    let calendar_dir = env::var("CALENDAR_DIR")
        .map_err(|_| anyhow::anyhow!("CALENDAR_DIR environment variable is required"))?;

    let store = store::CalendarStore::load_dir(&calendar_dir)?;
    if store.is_empty() {
        tracing::warn!("No calendars found under {}", calendar_dir);
    }

    let config = ServerConfig {
        base_url: env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000/".to_string()),
        rss_enabled: env::var("RSS_ENABLED")
            .map(|v| !matches!(v.as_str(), "N" | "n" | "0" | "false"))
            .unwrap_or(true),
    };

    let state = AppState {
        store: Arc::new(store),
        config: Arc::new(config),
    };

    server::start_server(state).await
}
