use serde::Deserialize;
use uuid::Uuid;

use super::repo_types::{ActivityLevel, FitnessGoal};

/// Onboarding questionnaire answers as sent by the app.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireRequest {
    pub user_id: Uuid,
    pub age: i32,
    #[serde(default)]
    pub gender: String,
    pub height: f64,
    pub current_weight: f64,
    pub target_weight: f64,
    pub activity_level: ActivityLevel,
    pub fitness_goal: FitnessGoal,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub health_conditions: Vec<String>,
    pub meals_per_day: i32,
    pub water_intake: i32,
    pub sleep_hours: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipRequest {
    pub user_id: Uuid,
}
