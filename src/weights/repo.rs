use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use super::repo_types::WeightSample;
use crate::error::AppResult;

pub async fn insert(db: &PgPool, user_id: Uuid, date: Date, weight: f64) -> AppResult<WeightSample> {
    let row = sqlx::query_as::<_, WeightSample>(
        r#"
        INSERT INTO weight_stats (user_id, date, weight)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, date, weight
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(weight)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list_between(
    db: &PgPool,
    user_id: Uuid,
    from: Date,
    to: Date,
) -> AppResult<Vec<WeightSample>> {
    let rows = sqlx::query_as::<_, WeightSample>(
        r#"
        SELECT id, user_id, date, weight
          FROM weight_stats
         WHERE user_id = $1 AND date >= $2 AND date <= $3
         ORDER BY date DESC, created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
