use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{QuestionnaireRequest, SkipRequest},
    repo_types::UserProfile,
    services,
};
use crate::{auth::AuthUser, error::AppResult, extractors::AppJson, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/profile/questionnaire", post(submit_questionnaire))
        .route("/profile/skip", post(skip_questionnaire))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<UserProfile>> {
    Ok(Json(services::get_profile(&state, user_id).await?))
}

#[instrument(skip(state, body))]
pub async fn submit_questionnaire(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<QuestionnaireRequest>,
) -> AppResult<Json<UserProfile>> {
    auth.ensure_owner(body.user_id)?;
    Ok(Json(services::submit_questionnaire(&state, auth.0, &body).await?))
}

#[instrument(skip(state, body))]
pub async fn skip_questionnaire(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<SkipRequest>,
) -> AppResult<Json<UserProfile>> {
    auth.ensure_owner(body.user_id)?;
    Ok(Json(services::skip_questionnaire(&state, auth.0).await?))
}
