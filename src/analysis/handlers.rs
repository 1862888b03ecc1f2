use axum::{
    extract::{DefaultBodyLimit, State},
    routing::post,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{AnalyzeFoodRequest, AnalyzeFoodResponse},
    services::analyze_food_image,
};
use crate::{
    auth::AuthUser, error::AppResult, extractors::AppJson, images::services::MAX_DATA_URI_BYTES,
    state::AppState,
};

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze-food", post(analyze_food))
        .layer(DefaultBodyLimit::max(MAX_DATA_URI_BYTES + 64 * 1024))
}

/// POST /analyze-food { imageUrl, userId }
#[instrument(skip(state, body))]
pub async fn analyze_food(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<AnalyzeFoodRequest>,
) -> AppResult<Json<AnalyzeFoodResponse>> {
    auth.ensure_owner(body.user_id)?;
    let data = analyze_food_image(&state, auth.0, &body.image_url).await?;
    Ok(Json(AnalyzeFoodResponse {
        success: true,
        data,
    }))
}
