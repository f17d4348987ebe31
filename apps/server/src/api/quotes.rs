use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};

use super::ApiJson;
use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{ErrorResponse, Quote, QuotesRequest, QuotesResponse},
};

#[utoipa::path(
    post,
    path = "/api/v1/quotes",
    request_body = QuotesRequest,
    responses(
        (status = 200, body = QuotesResponse),
        (status = 400, body = ErrorResponse),
        (status = 500, body = ErrorResponse)
    )
)]
pub async fn latest_quotes(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<QuotesRequest>,
) -> ApiResult<Json<QuotesResponse>> {
    let pairs = payload
        .pairs
        .ok_or_else(|| ApiError::BadRequest("pairs array is required".to_string()))?;

    if state.require_upstream && !state.upstream.is_configured() {
        return Err(ApiError::Internal(
            "Finnhub API key not configured".to_string(),
        ));
    }

    let quotes = state
        .quote_service
        .latest(pairs)
        .await
        .into_iter()
        .map(|(pair, view)| (pair, Quote::from(view)))
        .collect();

    Ok(Json(QuotesResponse { quotes }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/quotes", post(latest_quotes))
}
