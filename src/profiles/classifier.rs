//! Workout tier assignment from onboarding answers.

use super::repo_types::{ActivityLevel, FitnessGoal, WorkoutLevel};

/// The subset of questionnaire answers the tier depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierInputs {
    pub age: i32,
    pub activity_level: ActivityLevel,
    pub fitness_goal: FitnessGoal,
    pub current_weight: f64,
    pub target_weight: f64,
}

/// Weight gap (kg) above which the score is reduced by one.
const LARGE_WEIGHT_GAP: f64 = 20.0;

pub fn workout_score(inputs: &TierInputs) -> i32 {
    let mut score = match inputs.age {
        a if a < 30 => 3,
        a if a < 45 => 2,
        _ => 1,
    };

    score += match inputs.activity_level {
        ActivityLevel::VeryActive => 4,
        ActivityLevel::Active => 3,
        ActivityLevel::Moderate => 2,
        ActivityLevel::Light => 1,
        ActivityLevel::Sedentary => 0,
    };

    score += match inputs.fitness_goal {
        FitnessGoal::GainMuscle => 2,
        FitnessGoal::ImproveHealth => 1,
        FitnessGoal::LoseWeight | FitnessGoal::Maintain => 0,
    };

    if (inputs.current_weight - inputs.target_weight).abs() > LARGE_WEIGHT_GAP {
        score -= 1;
    }

    score
}

pub fn classify_workout_level(inputs: &TierInputs) -> WorkoutLevel {
    match workout_score(inputs) {
        s if s <= 3 => WorkoutLevel::Beginner,
        s if s <= 5 => WorkoutLevel::Easy,
        s if s <= 7 => WorkoutLevel::Intermediate,
        _ => WorkoutLevel::Advanced,
    }
}
