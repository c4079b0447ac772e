//! Operator tool: drop every cached interest match
//!
//! Run after changing the interest scorer so pairs are scored again on their
//! next lookup. Uses the same configuration as the server.

use shatter_ice::config::{CacheBackend, Settings};
use shatter_ice::services::{open_match_cache, PostgresClient};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    if let Err(e) = run().await {
        error!("Failed to clear the match cache: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;

    let postgres = match settings.cache.backend {
        CacheBackend::Memory => {
            info!("Memory backend configured; the cache lives inside the server process");
            return Ok(());
        }
        CacheBackend::Postgres => Some(
            PostgresClient::from_settings(
                &settings.database.url,
                Some(1),
                Some(1),
                settings.database.acquire_timeout_secs,
                settings.database.idle_timeout_secs,
            )
            .await?,
        ),
        CacheBackend::Redis => None,
    };

    let cache = open_match_cache(&settings.cache, postgres.as_ref()).await?;
    let cleared = cache.clear().await?;

    info!("Cleared {} cached matches from the {:?} backend", cleared, settings.cache.backend);
    println!("{}", cleared);

    Ok(())
}
