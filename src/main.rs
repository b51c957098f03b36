use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use lab_core::CoreConfig;
use lab_core::config::{latest_limit_from_env_value, seed_file_from_env_value};

/// Main entry point for the lab back office
///
/// Resolves configuration once, restores the optional seed file into fresh registries and
/// serves the REST API until the server fails or the process receives Ctrl-C.
///
/// # Environment Variables
/// - `LAB_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `LAB_LATEST_LIMIT`: Default size of the latest-registrations list (default: 5)
/// - `LAB_SEED_FILE`: Optional JSON/YAML seed file with initial patients and exams
///
/// # Returns
/// * `Ok(())` - On clean shutdown
/// * `Err(anyhow::Error)` - If configuration, seeding or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lab_run=info".parse()?)
                .add_directive("lab_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("LAB_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(CoreConfig::new(
        latest_limit_from_env_value(std::env::var("LAB_LATEST_LIMIT").ok())?,
        seed_file_from_env_value(std::env::var("LAB_SEED_FILE").ok()),
    )?);

    tracing::info!("++ Starting lab REST on {}", rest_addr);

    let state = AppState::bootstrap(cfg).await?;

    tokio::select! {
        result = api_rest::serve(&rest_addr, state) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("++ Shutting down"),
    }

    Ok(())
}
