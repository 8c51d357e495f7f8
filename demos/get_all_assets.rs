//! Fetch every asset from the QPS asset search and write them to `assets.json`.
//!
//! Credentials come from the usual settings files or `QUALYS_URL`,
//! `QUALYS_USERNAME` and `QUALYS_PASSWORD` (a `.env` file is honoured).
//! `LIMIT` sets the page size (default 100, maximum 1000).
//!
//!     RUST_LOG=qualysapi=debug cargo run --example get_all_assets

use anyhow::Context;
use qualysapi::api::{search_all, QpsRequest};
use qualysapi::{ConfigLoader, ContentType, RequestContext};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const SEARCH_PATH: &str = "/qps/rest/2.0/search/am/asset";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut settings = ConfigLoader::new()?.into_settings();
    if settings.username.is_none() && settings.bearer_token.is_none() {
        anyhow::bail!("username and password are required (set QUALYS_USERNAME / QUALYS_PASSWORD)");
    }
    settings.response_type = Some(ContentType::Json);

    let limit: u32 = std::env::var("LIMIT")
        .ok()
        .map(|v| v.parse::<u32>())
        .transpose()
        .context("LIMIT must be a number")?
        .unwrap_or(100)
        .clamp(1, 1000);

    let client = settings.build_client()?;
    let ctx = RequestContext::background().with_timeout(Duration::from_secs(30 * 60));

    tracing::info!(url = client.base_url(), limit, "fetching assets");
    let assets: Vec<serde_json::Value> =
        search_all(&client, &ctx, SEARCH_PATH, &QpsRequest::new(), limit).await?;

    let json = serde_json::to_string_pretty(&assets)?;
    std::fs::write("assets.json", json).context("writing assets.json")?;

    tracing::info!(total = assets.len(), "assets written to assets.json");
    Ok(())
}
