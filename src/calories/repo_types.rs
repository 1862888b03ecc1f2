use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::analysis::types::{FoodAnalysisResult, FoodItem};

/// One analysed meal inside a day's ledger. Stored as JSONB, camelCase keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealEntry {
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub foods: Vec<FoodItem>,
    pub total_calories: f64,
    pub analysis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl MealEntry {
    pub fn from_analysis(
        result: &FoodAnalysisResult,
        image_url: Option<String>,
        time: OffsetDateTime,
    ) -> Self {
        Self {
            time,
            foods: result.foods.clone(),
            total_calories: result.total_calories,
            analysis: result.analysis.clone(),
            image_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCalorieLedger {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub calories_consumed: f64,
    pub calories_goal: i32,
    pub meals: Vec<MealEntry>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl DailyCalorieLedger {
    /// Running total matches the meal list within float noise.
    #[cfg(test)]
    pub fn is_consistent(&self) -> bool {
        let sum: f64 = self.meals.iter().map(|m| m.total_calories).sum();
        (sum - self.calories_consumed).abs() < 1e-6
    }
}

#[derive(Debug, FromRow)]
pub struct DailyCalorieRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub calories_consumed: f64,
    pub calories_goal: i32,
    pub meals: Json<Vec<MealEntry>>,
    pub updated_at: OffsetDateTime,
}

impl From<DailyCalorieRow> for DailyCalorieLedger {
    fn from(r: DailyCalorieRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            date: r.date,
            calories_consumed: r.calories_consumed,
            calories_goal: r.calories_goal,
            meals: r.meals.0,
            updated_at: r.updated_at,
        }
    }
}
