use sqlx::{types::Json, PgPool};
use time::Date;
use uuid::Uuid;

use super::repo_types::{DailyCalorieLedger, DailyCalorieRow, MealEntry};
use crate::error::AppResult;

pub async fn find_by_date(
    db: &PgPool,
    user_id: Uuid,
    date: Date,
) -> AppResult<Option<DailyCalorieLedger>> {
    let row = sqlx::query_as::<_, DailyCalorieRow>(
        r#"
        SELECT id, user_id, date, calories_consumed, calories_goal, meals, updated_at
          FROM daily_calories
         WHERE user_id = $1 AND date = $2
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(db)
    .await?;
    Ok(row.map(Into::into))
}

pub async fn list_between(
    db: &PgPool,
    user_id: Uuid,
    from: Date,
    to: Date,
) -> AppResult<Vec<DailyCalorieLedger>> {
    let rows = sqlx::query_as::<_, DailyCalorieRow>(
        r#"
        SELECT id, user_id, date, calories_consumed, calories_goal, meals, updated_at
          FROM daily_calories
         WHERE user_id = $1 AND date >= $2 AND date <= $3
         ORDER BY date DESC
        "#,
    )
    .bind(user_id)
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Single-statement upsert: the increment and the append are applied by the
/// database under the row lock taken by `ON CONFLICT`, so two merges for the
/// same day serialize instead of overwriting each other.
pub async fn merge_meal(
    db: &PgPool,
    user_id: Uuid,
    date: Date,
    default_goal: i32,
    meal: &MealEntry,
) -> AppResult<DailyCalorieLedger> {
    let row = sqlx::query_as::<_, DailyCalorieRow>(
        r#"
        INSERT INTO daily_calories (user_id, date, calories_consumed, calories_goal, meals)
        VALUES ($1, $2, $3, $4, jsonb_build_array($5::jsonb))
        ON CONFLICT (user_id, date) DO UPDATE SET
            calories_consumed = daily_calories.calories_consumed + EXCLUDED.calories_consumed,
            meals = daily_calories.meals || EXCLUDED.meals,
            updated_at = now()
        RETURNING id, user_id, date, calories_consumed, calories_goal, meals, updated_at
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(meal.total_calories)
    .bind(default_goal)
    .bind(Json(meal))
    .fetch_one(db)
    .await?;
    Ok(row.into())
}
