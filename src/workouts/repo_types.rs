use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profiles::repo_types::WorkoutLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub level: WorkoutLevel,
    pub duration_minutes: i32,
    pub calories_burned: i32,
    pub exercises: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: OffsetDateTime,
}

/// A workout the user just finished; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewWorkout {
    pub title: String,
    pub level: WorkoutLevel,
    pub duration_minutes: i32,
    pub calories_burned: i32,
    pub exercises: Vec<String>,
}

#[derive(Debug, FromRow)]
pub struct WorkoutRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub level: String,
    pub duration: i32,
    pub calories_burned: i32,
    pub exercises: Vec<String>,
    pub completed_at: OffsetDateTime,
}

impl TryFrom<WorkoutRow> for WorkoutRecord {
    type Error = anyhow::Error;

    fn try_from(r: WorkoutRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            title: r.title,
            level: r.level.parse()?,
            duration_minutes: r.duration,
            calories_burned: r.calories_burned,
            exercises: r.exercises,
            completed_at: r.completed_at,
        })
    }
}
