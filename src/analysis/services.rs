use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    parser::parse_analysis,
    prompts::{system_prompt, user_instruction},
    types::FoodAnalysisResult,
};
use crate::{
    error::{AppError, AppResult},
    images::services::classify_image_reference,
    llm::{CompletionRequest, ImageDetail, ImageInput},
    state::AppState,
};

/// Sends the photo to the vision model and returns the validated analysis.
#[instrument(skip(state, image_url), fields(user_id = %user_id))]
pub async fn analyze_food_image(
    state: &AppState,
    user_id: Uuid,
    image_url: &str,
) -> AppResult<FoodAnalysisResult> {
    let kind = classify_image_reference(image_url)?;
    let food = &state.config.food;

    let request = CompletionRequest::text(system_prompt(food.policy), user_instruction(food.policy))
        .with_image(ImageInput {
            url: image_url.trim().to_string(),
            detail: ImageDetail::High,
        })
        .with_sampling(food.temperature, food.max_tokens);

    let llm = state.llm.as_ref();
    let req = &request;
    let raw = state
        .retry_policy()
        .run("food_analysis", move || llm.complete(req))
        .await?;

    if raw.trim().is_empty() {
        return Err(AppError::data_format("model returned no content", raw));
    }

    let result = parse_analysis(&raw)?;
    if !result.warnings.is_empty() {
        warn!(warnings = ?result.warnings, "analysis totals need attention");
    }
    info!(
        ?kind,
        foods = result.foods.len(),
        total_calories = result.total_calories,
        policy = ?food.policy,
        "food image analysed"
    );
    Ok(result)
}
