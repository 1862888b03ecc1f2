use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    LoseWeight,
    GainMuscle,
    Maintain,
    ImproveHealth,
}

/// Ordinal workout tier; variant order is difficulty order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutLevel {
    Beginner,
    Easy,
    Intermediate,
    Advanced,
}

macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => anyhow::bail!(concat!("unknown ", stringify!($ty), ": {}"), other),
                }
            }
        }
    };
}

text_enum!(ActivityLevel {
    Sedentary => "sedentary",
    Light => "light",
    Moderate => "moderate",
    Active => "active",
    VeryActive => "very_active",
});

text_enum!(FitnessGoal {
    LoseWeight => "lose_weight",
    GainMuscle => "gain_muscle",
    Maintain => "maintain",
    ImproveHealth => "improve_health",
});

text_enum!(WorkoutLevel {
    Beginner => "beginner",
    Easy => "easy",
    Intermediate => "intermediate",
    Advanced => "advanced",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: Uuid,
    pub age: i32,
    pub gender: String,
    pub height: f64,
    pub current_weight: f64,
    pub target_weight: f64,
    pub activity_level: ActivityLevel,
    pub fitness_goal: FitnessGoal,
    pub dietary_restrictions: Vec<String>,
    pub health_conditions: Vec<String>,
    pub meals_per_day: i32,
    pub water_intake: i32,
    pub sleep_hours: f64,
    pub workout_level: WorkoutLevel,
    pub onboarding_completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Row as stored in `user_profiles`; enums are kept as text columns.
#[derive(Debug, FromRow)]
pub struct UserProfileRow {
    pub user_id: Uuid,
    pub age: i32,
    pub gender: String,
    pub height: f64,
    pub current_weight: f64,
    pub target_weight: f64,
    pub activity_level: String,
    pub fitness_goal: String,
    pub dietary_restrictions: Vec<String>,
    pub health_conditions: Vec<String>,
    pub meals_per_day: i32,
    pub water_intake: i32,
    pub sleep_hours: f64,
    pub workout_level: String,
    pub onboarding_completed: bool,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<UserProfileRow> for UserProfile {
    type Error = anyhow::Error;

    fn try_from(r: UserProfileRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: r.user_id,
            age: r.age,
            gender: r.gender,
            height: r.height,
            current_weight: r.current_weight,
            target_weight: r.target_weight,
            activity_level: r.activity_level.parse()?,
            fitness_goal: r.fitness_goal.parse()?,
            dietary_restrictions: r.dietary_restrictions,
            health_conditions: r.health_conditions,
            meals_per_day: r.meals_per_day,
            water_intake: r.water_intake,
            sleep_hours: r.sleep_hours,
            workout_level: r.workout_level.parse()?,
            onboarding_completed: r.onboarding_completed,
            updated_at: r.updated_at,
        })
    }
}
