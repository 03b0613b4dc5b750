//! Router de la API
//!
//! Monta las rutas de autenticación y vehículos junto con las capas
//! transversales (trace, timeout, compresión y CORS).

pub mod auth_routes;
pub mod vehicle_routes;

use axum::{error_handling::HandleErrorLayer, response::Json, routing::get, BoxError, Router};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::cors::cors_layer;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Router completo con el estado ya inyectado
pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth_routes::create_auth_router(&state))
        .nest("/vehicles", vehicle_routes::create_vehicle_router(&state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(timeout)
                .layer(CompressionLayer::new())
                .layer(cors_layer(&state.config)),
        )
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        AppError::ServiceUnavailable("Request timed out".to_string())
    } else {
        AppError::Internal(format!("Unhandled middleware error: {}", err))
    }
}
