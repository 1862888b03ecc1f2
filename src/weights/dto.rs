use serde::Deserialize;
use time::Date;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordWeightRequest {
    pub user_id: Uuid,
    pub weight: f64,
    #[serde(default)]
    pub date: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub struct WeightWindow {
    #[serde(default = "default_days")]
    pub days: i64,
}
fn default_days() -> i64 {
    30
}
