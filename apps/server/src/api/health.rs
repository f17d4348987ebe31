use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::{
    main_lib::AppState,
    models::{HealthResponse, ReadinessResponse},
};

#[utoipa::path(get, path = "/api/v1/healthz", responses((status = 200, body = HealthResponse)))]
pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Ready as soon as the caches exist; reports whether answers come from the
/// provider or from fallback.
#[utoipa::path(get, path = "/api/v1/readyz", responses((status = 200, body = ReadinessResponse)))]
pub async fn readyz(State(state): State<Arc<AppState>>) -> Json<ReadinessResponse> {
    let upstream_configured = state.upstream.is_configured();
    Json(ReadinessResponse {
        status: if upstream_configured { "ok" } else { "degraded" }.to_string(),
        upstream: state.upstream.id().to_string(),
        upstream_configured,
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
