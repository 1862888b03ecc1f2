use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WeightSample {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub weight: f64,
}
