use time::{Date, Duration, OffsetDateTime};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::repo_types::{DailyCalorieLedger, MealEntry};
use crate::{
    analysis::{parser::validate_result, types::FoodAnalysisResult},
    error::{AppError, AppResult},
    images::services::reference_for_storage,
    state::AppState,
};

/// Adds one analysed meal to the user's ledger for `date` (today, UTC, when `None`).
///
/// The ledger total grows by the result's reported `total_calories`; it is
/// never recomputed from the meal list.
#[instrument(skip(state, result, image_url), fields(user_id = %user_id))]
pub async fn record_meal(
    state: &AppState,
    user_id: Uuid,
    date: Option<Date>,
    result: &FoodAnalysisResult,
    image_url: Option<&str>,
) -> AppResult<DailyCalorieLedger> {
    let warnings = validate_result(result)?;
    if !warnings.is_empty() {
        warn!(?warnings, "submitted meal totals need attention");
    }

    let now = OffsetDateTime::now_utc();
    let date = date.unwrap_or_else(|| now.date());
    let entry = MealEntry::from_analysis(result, image_url.and_then(reference_for_storage), now);

    let ledger = state
        .store
        .merge_meal(user_id, date, state.config.food.default_calorie_goal, entry)
        .await?;

    info!(
        %date,
        added = result.total_calories,
        consumed = ledger.calories_consumed,
        meals = ledger.meals.len(),
        "meal recorded"
    );
    Ok(ledger)
}

pub async fn ledger_for_date(
    state: &AppState,
    user_id: Uuid,
    date: Date,
) -> AppResult<DailyCalorieLedger> {
    state
        .store
        .ledger_for_date(user_id, date)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no calorie log for {date}")))
}

/// Ledgers from `days` days ago through today, newest first.
pub async fn recent_ledgers(
    state: &AppState,
    user_id: Uuid,
    days: i64,
) -> AppResult<Vec<DailyCalorieLedger>> {
    let today = OffsetDateTime::now_utc().date();
    let from = today - Duration::days(days);
    state.store.ledgers_between(user_id, from, today).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::FoodItem;
    use time::macros::date;

    fn result(kcal: f64) -> FoodAnalysisResult {
        FoodAnalysisResult {
            foods: vec![FoodItem {
                name: "Pasta".into(),
                portion: "1 plate".into(),
                calories: kcal,
                protein: 12.0,
                carbs: 60.0,
                fat: 8.0,
            }],
            total_calories: kcal,
            total_protein: 12.0,
            total_carbs: 60.0,
            total_fat: 8.0,
            analysis: "Carb-heavy".into(),
            recommendations: None,
            warnings: vec![],
        }
    }

    #[tokio::test]
    async fn first_meal_creates_ledger_second_adds_to_it() {
        let state = AppState::fake();
        let user = Uuid::new_v4();
        let day = date!(2026 - 10 - 19);

        let first = record_meal(&state, user, Some(day), &result(450.0), None)
            .await
            .unwrap();
        assert_eq!(first.calories_consumed, 450.0);
        assert_eq!(first.calories_goal, 2000);
        assert_eq!(first.meals.len(), 1);

        let second = record_meal(&state, user, Some(day), &result(300.0), None)
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.calories_consumed, 750.0);
        assert_eq!(second.meals.len(), 2);
        assert!(second.is_consistent());
    }

    #[tokio::test]
    async fn running_total_trusts_reported_totals() {
        let state = AppState::fake();
        let user = Uuid::new_v4();
        let mut r = result(500.0);
        r.foods[0].calories = 100.0;

        let ledger = record_meal(&state, user, None, &r, None).await.unwrap();
        assert_eq!(ledger.calories_consumed, 500.0);
        assert_eq!(ledger.date, OffsetDateTime::now_utc().date());
    }

    #[tokio::test]
    async fn meals_on_other_days_or_users_stay_separate() {
        let state = AppState::fake();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        record_meal(&state, alice, Some(date!(2026 - 10 - 18)), &result(200.0), None)
            .await
            .unwrap();
        record_meal(&state, alice, Some(date!(2026 - 10 - 19)), &result(300.0), None)
            .await
            .unwrap();
        record_meal(&state, bob, Some(date!(2026 - 10 - 19)), &result(900.0), None)
            .await
            .unwrap();

        let a = ledger_for_date(&state, alice, date!(2026 - 10 - 19)).await.unwrap();
        assert_eq!(a.calories_consumed, 300.0);
        let missing = ledger_for_date(&state, bob, date!(2026 - 10 - 18)).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn image_urls_are_kept_but_inline_data_is_not() {
        let state = AppState::fake();
        let user = Uuid::new_v4();
        let day = date!(2026 - 10 - 19);
        record_meal(&state, user, Some(day), &result(100.0), Some("https://x.test/a.jpg"))
            .await
            .unwrap();
        let ledger = record_meal(
            &state,
            user,
            Some(day),
            &result(100.0),
            Some("data:image/png;base64,AAAA"),
        )
        .await
        .unwrap();
        assert_eq!(ledger.meals[0].image_url.as_deref(), Some("https://x.test/a.jpg"));
        assert_eq!(ledger.meals[1].image_url, None);
    }

    #[tokio::test]
    async fn negative_item_values_never_reach_the_ledger() {
        let state = AppState::fake();
        let user = Uuid::new_v4();
        let day = date!(2026 - 10 - 19);
        let mut r = result(10.0);
        r.foods[0].calories = -500.0;
        r.foods[0].protein = -1.0;

        let err = record_meal(&state, user, Some(day), &r, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(state.store.ledger_for_date(user, day).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn negative_totals_are_rejected() {
        let state = AppState::fake();
        let err = record_meal(&state, Uuid::new_v4(), None, &result(-1.0), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
