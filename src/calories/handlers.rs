use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use time::{macros::format_description, Date};
use tracing::instrument;

use super::{
    dto::{LedgerWindow, RecordMealRequest},
    repo_types::DailyCalorieLedger,
    services,
};
use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    extractors::{AppJson, AppQuery},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/calories", get(list_ledgers))
        .route("/calories/:date", get(get_ledger))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/calories/meals", post(record_meal))
}

/// POST /calories/meals
#[instrument(skip(state, body))]
pub async fn record_meal(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<RecordMealRequest>,
) -> AppResult<Json<DailyCalorieLedger>> {
    auth.ensure_owner(body.user_id)?;
    let ledger = services::record_meal(
        &state,
        auth.0,
        body.date,
        &body.result,
        body.image_url.as_deref(),
    )
    .await?;
    Ok(Json(ledger))
}

#[instrument(skip(state))]
pub async fn list_ledgers(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppQuery(w): AppQuery<LedgerWindow>,
) -> AppResult<Json<Vec<DailyCalorieLedger>>> {
    let days = checked_window(w.days)?;
    Ok(Json(services::recent_ledgers(&state, user_id, days).await?))
}

#[instrument(skip(state))]
pub async fn get_ledger(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> AppResult<Json<DailyCalorieLedger>> {
    let date = Date::parse(&date, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::validation("date must be YYYY-MM-DD"))?;
    Ok(Json(services::ledger_for_date(&state, user_id, date).await?))
}

/// Shared by the list endpoints: windows run from 1 to 365 days.
pub fn checked_window(days: i64) -> AppResult<i64> {
    if !(1..=365).contains(&days) {
        return Err(AppError::validation("days must be between 1 and 365"));
    }
    Ok(days)
}
