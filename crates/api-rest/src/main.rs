//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful during development when you want the API (with OpenAPI/Swagger UI) without going
//! through the workspace's `lab-run` binary. Both resolve the same configuration.

use api_rest::AppState;
use lab_core::config::{latest_limit_from_env_value, seed_file_from_env_value};
use lab_core::CoreConfig;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the lab REST API server
///
/// # Environment Variables
/// - `LAB_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `LAB_LATEST_LIMIT`: Default size of the latest-registrations list (default: 5)
/// - `LAB_SEED_FILE`: Optional JSON/YAML file with initial patients and exams
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration or seed file is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("lab_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("LAB_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(CoreConfig::new(
        latest_limit_from_env_value(std::env::var("LAB_LATEST_LIMIT").ok())?,
        seed_file_from_env_value(std::env::var("LAB_SEED_FILE").ok()),
    )?);

    tracing::info!("-- Starting lab REST API on {}", addr);

    let state = AppState::bootstrap(cfg).await?;
    api_rest::serve(&addr, state).await
}
