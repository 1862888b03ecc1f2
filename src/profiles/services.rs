use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    classifier::{classify_workout_level, TierInputs},
    dto::QuestionnaireRequest,
    repo_types::{ActivityLevel, FitnessGoal, UserProfile, WorkoutLevel},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub const UNSPECIFIED_GENDER: &str = "not informed";

fn check_answers(q: &QuestionnaireRequest) -> AppResult<()> {
    if !(1..=120).contains(&q.age) {
        return Err(AppError::validation("age must be between 1 and 120"));
    }
    for (label, value) in [
        ("height", q.height),
        ("currentWeight", q.current_weight),
        ("targetWeight", q.target_weight),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(AppError::validation(format!("{label} must be positive")));
        }
    }
    if !(1..=12).contains(&q.meals_per_day) {
        return Err(AppError::validation("mealsPerDay must be between 1 and 12"));
    }
    if !(0..=40).contains(&q.water_intake) {
        return Err(AppError::validation("waterIntake must be between 0 and 40"));
    }
    if !q.sleep_hours.is_finite() || !(0.0..=24.0).contains(&q.sleep_hours) {
        return Err(AppError::validation("sleepHours must be between 0 and 24"));
    }
    Ok(())
}

/// Trimmed, de-duplicated, sorted.
fn as_set(items: &[String]) -> Vec<String> {
    let mut out: Vec<String> = items
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

#[instrument(skip(state, answers), fields(user_id = %user_id))]
pub async fn submit_questionnaire(
    state: &AppState,
    user_id: Uuid,
    answers: &QuestionnaireRequest,
) -> AppResult<UserProfile> {
    check_answers(answers)?;

    let workout_level = classify_workout_level(&TierInputs {
        age: answers.age,
        activity_level: answers.activity_level,
        fitness_goal: answers.fitness_goal,
        current_weight: answers.current_weight,
        target_weight: answers.target_weight,
    });

    let gender = answers.gender.trim();
    let profile = UserProfile {
        user_id,
        age: answers.age,
        gender: if gender.is_empty() {
            UNSPECIFIED_GENDER.to_string()
        } else {
            gender.to_string()
        },
        height: answers.height,
        current_weight: answers.current_weight,
        target_weight: answers.target_weight,
        activity_level: answers.activity_level,
        fitness_goal: answers.fitness_goal,
        dietary_restrictions: as_set(&answers.dietary_restrictions),
        health_conditions: as_set(&answers.health_conditions),
        meals_per_day: answers.meals_per_day,
        water_intake: answers.water_intake,
        sleep_hours: answers.sleep_hours,
        workout_level,
        onboarding_completed: true,
        updated_at: OffsetDateTime::now_utc(),
    };

    let saved = state.store.upsert_profile(profile).await?;
    info!(%workout_level, "questionnaire completed");
    Ok(saved)
}

/// Profile stored when the user skips onboarding.
pub fn default_profile(user_id: Uuid, now: OffsetDateTime) -> UserProfile {
    UserProfile {
        user_id,
        age: 25,
        gender: UNSPECIFIED_GENDER.to_string(),
        height: 170.0,
        current_weight: 70.0,
        target_weight: 70.0,
        activity_level: ActivityLevel::Moderate,
        fitness_goal: FitnessGoal::ImproveHealth,
        dietary_restrictions: vec![],
        health_conditions: vec![],
        meals_per_day: 3,
        water_intake: 8,
        sleep_hours: 7.0,
        workout_level: WorkoutLevel::Beginner,
        onboarding_completed: false,
        updated_at: now,
    }
}

#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn skip_questionnaire(state: &AppState, user_id: Uuid) -> AppResult<UserProfile> {
    let saved = state
        .store
        .upsert_profile(default_profile(user_id, OffsetDateTime::now_utc()))
        .await?;
    info!("questionnaire skipped, defaults stored");
    Ok(saved)
}

pub async fn get_profile(state: &AppState, user_id: Uuid) -> AppResult<UserProfile> {
    state
        .store
        .get_profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("profile not found".into()))
}
