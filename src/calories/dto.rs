use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use crate::analysis::types::FoodAnalysisResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMealRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub date: Option<Date>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub result: FoodAnalysisResult,
}

#[derive(Debug, Deserialize)]
pub struct LedgerWindow {
    #[serde(default = "default_days")]
    pub days: i64,
}
fn default_days() -> i64 {
    7
}
