use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{UserProfile, UserProfileRow};
use crate::error::AppResult;

const PROFILE_COLUMNS: &str = r#"
    user_id, age, gender, height, current_weight, target_weight, activity_level,
    fitness_goal, dietary_restrictions, health_conditions, meals_per_day, water_intake,
    sleep_hours, workout_level, onboarding_completed, updated_at
"#;

pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> AppResult<Option<UserProfile>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = $1");
    let row = sqlx::query_as::<_, UserProfileRow>(&sql)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
    Ok(row.map(UserProfile::try_from).transpose().context("decode profile row")?)
}

/// Insert or replace; `user_id` is the conflict key so a user never has two rows.
pub async fn upsert(db: &PgPool, p: &UserProfile) -> AppResult<UserProfile> {
    let sql = format!(
        r#"
        INSERT INTO user_profiles ({PROFILE_COLUMNS})
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        ON CONFLICT (user_id) DO UPDATE SET
            age = EXCLUDED.age,
            gender = EXCLUDED.gender,
            height = EXCLUDED.height,
            current_weight = EXCLUDED.current_weight,
            target_weight = EXCLUDED.target_weight,
            activity_level = EXCLUDED.activity_level,
            fitness_goal = EXCLUDED.fitness_goal,
            dietary_restrictions = EXCLUDED.dietary_restrictions,
            health_conditions = EXCLUDED.health_conditions,
            meals_per_day = EXCLUDED.meals_per_day,
            water_intake = EXCLUDED.water_intake,
            sleep_hours = EXCLUDED.sleep_hours,
            workout_level = EXCLUDED.workout_level,
            onboarding_completed = EXCLUDED.onboarding_completed,
            updated_at = EXCLUDED.updated_at
        RETURNING {PROFILE_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, UserProfileRow>(&sql)
        .bind(p.user_id)
        .bind(p.age)
        .bind(&p.gender)
        .bind(p.height)
        .bind(p.current_weight)
        .bind(p.target_weight)
        .bind(p.activity_level.as_str())
        .bind(p.fitness_goal.as_str())
        .bind(&p.dietary_restrictions)
        .bind(&p.health_conditions)
        .bind(p.meals_per_day)
        .bind(p.water_intake)
        .bind(p.sleep_hours)
        .bind(p.workout_level.as_str())
        .bind(p.onboarding_completed)
        .bind(p.updated_at)
        .fetch_one(db)
        .await?;
    Ok(UserProfile::try_from(row).context("decode profile row")?)
}
