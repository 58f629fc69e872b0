//! HTTP server initialization and routing

use axum::routing::get;
use axum::Router;
use log::{error, info};
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

use crate::core::shared::state::AppState;
use crate::embedded_ui::{configure_static_routes, list_embedded_files};
use crate::main_module::{health_check, shutdown_signal};
use crate::security::security_headers_middleware;
use crate::tasks::configure_task_routes;

pub fn build_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .merge(configure_task_routes())
        .merge(configure_static_routes())
        .route("/health", get(health_check))
        // Last added runs first: cookies must be parsed before handlers see them.
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

pub async fn run_axum_server(app_state: Arc<AppState>) -> std::io::Result<()> {
    let addr = app_state.config.bind_address();

    info!(
        "Embedded UI contains {} files",
        list_embedded_files().len()
    );

    let app = build_router(app_state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(
                "Failed to bind to {}: {} - is another instance running?",
                addr, e
            );
            return Err(e);
        }
    };
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(std::io::Error::other)?;

    info!("Server stopped");
    Ok(())
}
