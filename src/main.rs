use anyhow::Context;
use dotenvy::dotenv;
use log::{error, info};
use std::sync::Arc;

use planner::core::config::AppConfig;
use planner::core::shared::state::AppState;
use planner::core::shared::utils::create_conn;
use planner::main_module::{init_logging, run_axum_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let config = AppConfig::from_env().context("invalid configuration")?;
    info!(
        "Starting {} v{} with database {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.database.url
    );

    let pool = create_conn(&config.database)
        .with_context(|| format!("failed to open database {}", config.database.url))?;

    let app_state = Arc::new(AppState::new(config, pool));

    if let Err(e) = app_state.task_engine.initialize().await {
        error!("Failed to prepare task store: {}", e);
        return Err(e.into());
    }

    run_axum_server(app_state)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
