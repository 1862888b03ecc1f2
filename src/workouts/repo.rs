use anyhow::Context;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewWorkout, WorkoutRecord, WorkoutRow};
use crate::error::AppResult;

pub async fn insert(db: &PgPool, user_id: Uuid, w: &NewWorkout) -> AppResult<WorkoutRecord> {
    let row = sqlx::query_as::<_, WorkoutRow>(
        r#"
        INSERT INTO workouts (user_id, title, level, duration, calories_burned, exercises)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, title, level, duration, calories_burned, exercises, completed_at
        "#,
    )
    .bind(user_id)
    .bind(&w.title)
    .bind(w.level.as_str())
    .bind(w.duration_minutes)
    .bind(w.calories_burned)
    .bind(&w.exercises)
    .fetch_one(db)
    .await?;
    Ok(WorkoutRecord::try_from(row).context("decode workout row")?)
}

pub async fn list_between(
    db: &PgPool,
    user_id: Uuid,
    from: OffsetDateTime,
    to: OffsetDateTime,
) -> AppResult<Vec<WorkoutRecord>> {
    let rows = sqlx::query_as::<_, WorkoutRow>(
        r#"
        SELECT id, user_id, title, level, duration, calories_burned, exercises, completed_at
          FROM workouts
         WHERE user_id = $1 AND completed_at >= $2 AND completed_at <= $3
         ORDER BY completed_at DESC
        "#,
    )
    .bind(user_id)
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await?;

    let records = rows
        .into_iter()
        .map(WorkoutRecord::try_from)
        .collect::<anyhow::Result<Vec<_>>>()
        .context("decode workout rows")?;
    Ok(records)
}
