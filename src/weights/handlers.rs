use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{RecordWeightRequest, WeightWindow},
    repo_types::WeightSample,
    services,
};
use crate::{
    auth::AuthUser,
    calories::handlers::checked_window,
    error::AppResult,
    extractors::{AppJson, AppQuery},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/weights", get(list_weights).post(record_weight))
}

#[instrument(skip(state, body))]
pub async fn record_weight(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<RecordWeightRequest>,
) -> AppResult<Json<WeightSample>> {
    auth.ensure_owner(body.user_id)?;
    Ok(Json(
        services::record_weight(&state, auth.0, body.weight, body.date).await?,
    ))
}

#[instrument(skip(state))]
pub async fn list_weights(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppQuery(w): AppQuery<WeightWindow>,
) -> AppResult<Json<Vec<WeightSample>>> {
    let days = checked_window(w.days)?;
    Ok(Json(services::recent_weights(&state, user_id, days).await?))
}
