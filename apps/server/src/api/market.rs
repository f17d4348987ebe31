use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tradesync_core::{market_status, Language};

use crate::{
    main_lib::AppState,
    models::{LangQuery, MarketStatusResponse},
};

#[utoipa::path(
    get,
    path = "/api/v1/market/status",
    params(LangQuery),
    responses((status = 200, body = MarketStatusResponse))
)]
pub async fn get_market_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LangQuery>,
) -> Json<MarketStatusResponse> {
    let lang = query
        .lang
        .as_deref()
        .map(Language::from_code)
        .unwrap_or_default();
    Json(market_status(state.clock.now(), lang).into())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/market/status", get(get_market_status))
}
