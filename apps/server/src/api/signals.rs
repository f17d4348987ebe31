use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};

use super::ApiJson;
use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{ErrorResponse, SignalRequest, SignalResponse},
};

#[utoipa::path(
    post,
    path = "/api/v1/signals",
    request_body = SignalRequest,
    responses(
        (status = 200, body = SignalResponse),
        (status = 400, body = ErrorResponse)
    )
)]
pub async fn generate_signal(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<SignalRequest>,
) -> ApiResult<Json<SignalResponse>> {
    let signal = state.signal_service.generate(payload.into()).await?;
    Ok(Json(SignalResponse::from(signal)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/signals", post(generate_signal))
}
