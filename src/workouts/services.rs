use time::{Duration, OffsetDateTime};
use tracing::{info, instrument};
use uuid::Uuid;

use super::repo_types::{NewWorkout, WorkoutRecord};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

#[instrument(skip(state, workout), fields(user_id = %user_id, title = %workout.title))]
pub async fn complete_workout(
    state: &AppState,
    user_id: Uuid,
    mut workout: NewWorkout,
) -> AppResult<WorkoutRecord> {
    workout.title = workout.title.trim().to_string();
    if workout.title.is_empty() {
        return Err(AppError::validation("title is required"));
    }
    if workout.duration_minutes <= 0 {
        return Err(AppError::validation("duration must be positive"));
    }
    if workout.calories_burned < 0 {
        return Err(AppError::validation("caloriesBurned must not be negative"));
    }
    workout.exercises.retain(|e| !e.trim().is_empty());

    let record = state.store.insert_workout(user_id, workout).await?;
    info!(workout_id = %record.id, level = %record.level, "workout completed");
    Ok(record)
}

/// Workouts completed in the last `days` days, newest first.
pub async fn recent_workouts(
    state: &AppState,
    user_id: Uuid,
    days: i64,
) -> AppResult<Vec<WorkoutRecord>> {
    let now = OffsetDateTime::now_utc();
    state
        .store
        .workouts_between(user_id, now - Duration::days(days), now)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::repo_types::WorkoutLevel;

    fn workout(title: &str, minutes: i32, kcal: i32) -> NewWorkout {
        NewWorkout {
            title: title.into(),
            level: WorkoutLevel::Easy,
            duration_minutes: minutes,
            calories_burned: kcal,
            exercises: vec!["squats".into(), " ".into()],
        }
    }

    #[tokio::test]
    async fn completed_workouts_are_listed_newest_first() {
        let state = AppState::fake();
        let user = Uuid::new_v4();
        complete_workout(&state, user, workout("Morning run", 30, 250))
            .await
            .unwrap();
        let second = complete_workout(&state, user, workout(" Yoga ", 45, 120))
            .await
            .unwrap();
        assert_eq!(second.title, "Yoga");
        assert_eq!(second.exercises, vec!["squats".to_string()]);

        let listed = recent_workouts(&state, user, 14).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].completed_at >= listed[1].completed_at);
    }

    #[tokio::test]
    async fn invalid_workouts_are_rejected() {
        let state = AppState::fake();
        let user = Uuid::new_v4();
        for bad in [workout("  ", 30, 10), workout("Run", 0, 10), workout("Run", 20, -5)] {
            let err = complete_workout(&state, user, bad).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert!(recent_workouts(&state, user, 14).await.unwrap().is_empty());
    }
}
