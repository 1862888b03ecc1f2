use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::FoodAnalysisResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeFoodRequest {
    #[serde(default, alias = "imageReference")]
    pub image_url: String,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeFoodResponse {
    pub success: bool,
    pub data: FoodAnalysisResult,
}
