use serde::Deserialize;
use uuid::Uuid;

use crate::profiles::repo_types::WorkoutLevel;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteWorkoutRequest {
    pub user_id: Uuid,
    pub title: String,
    pub level: WorkoutLevel,
    #[serde(alias = "duration")]
    pub duration_minutes: i32,
    #[serde(default)]
    pub calories_burned: i32,
    #[serde(default)]
    pub exercises: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct WorkoutWindow {
    #[serde(default = "default_days")]
    pub days: i64,
}
fn default_days() -> i64 {
    14
}
