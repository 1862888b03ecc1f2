use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{CompleteWorkoutRequest, WorkoutWindow},
    repo_types::{NewWorkout, WorkoutRecord},
    services,
};
use crate::{
    auth::AuthUser,
    calories::handlers::checked_window,
    error::AppResult,
    extractors::{AppJson, AppQuery},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/workouts", get(list_workouts).post(complete_workout))
}

#[instrument(skip(state, body))]
pub async fn complete_workout(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(body): AppJson<CompleteWorkoutRequest>,
) -> AppResult<Json<WorkoutRecord>> {
    auth.ensure_owner(body.user_id)?;
    let workout = NewWorkout {
        title: body.title,
        level: body.level,
        duration_minutes: body.duration_minutes,
        calories_burned: body.calories_burned,
        exercises: body.exercises,
    };
    Ok(Json(services::complete_workout(&state, auth.0, workout).await?))
}

#[instrument(skip(state))]
pub async fn list_workouts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppQuery(w): AppQuery<WorkoutWindow>,
) -> AppResult<Json<Vec<WorkoutRecord>>> {
    let days = checked_window(w.days)?;
    Ok(Json(services::recent_workouts(&state, user_id, days).await?))
}
