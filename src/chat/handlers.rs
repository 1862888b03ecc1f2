use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use super::services;
use crate::{auth::AuthUser, error::AppResult, extractors::AppJson, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}

#[instrument(skip(state, body))]
pub async fn chat(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    auth.ensure_owner(body.user_id)?;
    let message = services::reply(&state, auth.0, &body.message).await?;
    Ok(Json(ChatResponse { message }))
}
