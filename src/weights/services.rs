use time::{Date, Duration, OffsetDateTime};
use tracing::{info, instrument};
use uuid::Uuid;

use super::repo_types::WeightSample;
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn record_weight(
    state: &AppState,
    user_id: Uuid,
    weight: f64,
    date: Option<Date>,
) -> AppResult<WeightSample> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(AppError::validation("weight must be positive"));
    }
    let date = date.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let sample = state.store.insert_weight(user_id, date, weight).await?;
    info!(%date, weight, "weight recorded");
    Ok(sample)
}

pub async fn recent_weights(
    state: &AppState,
    user_id: Uuid,
    days: i64,
) -> AppResult<Vec<WeightSample>> {
    let today = OffsetDateTime::now_utc().date();
    state
        .store
        .weights_between(user_id, today - Duration::days(days), today)
        .await
}
