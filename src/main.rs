use std::error::Error;

use ai_llm_service::telemetry;
use tracing::{Level, info, warn};
use tracing_subscriber::{Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file when present.
    let dotenv = dotenvy::dotenv();

    let env_filter = telemetry::env_filter_with_level("info", Level::INFO);

    // The companion library renders its own events with source locations.
    let app_events = filter::filter_fn(|meta| !meta.target().starts_with(telemetry::TARGET_PREFIX));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_timer(telemetry::ChronoRfc3339Utc)
                .with_target(true)
                .compact()
                .with_filter(app_events),
        )
        .with(telemetry::layer())
        .try_init()?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => info!("no .env file, using process environment"),
        Err(e) => warn!(error = %e, "ignoring unreadable .env file"),
    }

    api::start().await?;

    Ok(())
}
