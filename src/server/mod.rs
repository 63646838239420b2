use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::config::ServerConfig;
use crate::cortex::{CortexClient, CortexRestClient};

pub mod handlers;
pub mod models;

use handlers::{
    cortex_completion_handler, cortex_status_handler, get_pattern_handler, health_check,
    list_patterns_handler, sample_context_handler, translate_batch_handler,
    translate_expression_handler, translate_measure_handler, translate_tmdl_handler,
    validate_sql_handler,
};

/// Shared application state. Translators are built per request; the Cortex
/// client and configuration are shared across all of them.
pub struct AppState {
    pub config: ServerConfig,
    pub cortex_client: Option<Arc<dyn CortexClient>>,
}

/// Build the application router over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let body_limit = state.config.body_limit_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/translate/expression", post(translate_expression_handler))
        .route("/translate/measure", post(translate_measure_handler))
        .route("/translate/batch", post(translate_batch_handler))
        .route("/translate/tmdl", post(translate_tmdl_handler))
        .route("/translate/patterns", get(list_patterns_handler))
        .route("/translate/patterns/{function}", get(get_pattern_handler))
        .route("/translate/context/sample", get(sample_context_handler))
        .route("/translate/validate", post(validate_sql_handler))
        .route("/translate/cortex", post(cortex_completion_handler))
        .route("/translate/cortex/status", get(cortex_status_handler))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}

/// Run with configuration from environment variables.
pub async fn run() {
    dotenv().ok();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    run_with_config(config).await;
}

pub async fn run_with_config(config: ServerConfig) {
    dotenv().ok();

    log::info!(
        "Server configuration: http={}:{}, use_llm={}, cortex_enabled={}, model={}",
        config.http_host,
        config.http_port,
        config.use_llm,
        config.cortex_enabled,
        config.cortex_model
    );

    let cortex_client: Option<Arc<dyn CortexClient>> = if config.cortex_enabled {
        log::info!("Cortex enhancement enabled with model '{}'", config.cortex_model);
        Some(Arc::new(CortexRestClient::new(config.cortex_model.clone())))
    } else {
        None
    };

    let addr = format!("{}:{}", config.http_host, config.http_port);
    let state = Arc::new(AppState {
        config,
        cortex_client,
    });
    let app = build_router(state);

    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    log::info!("SnowDAX listening on {}", addr);
    if let Err(e) = axum::serve(listener, app).await {
        log::error!("Server error: {}", e);
    }
}
