//! Turns raw vision-model text into a validated [`FoodAnalysisResult`].

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use super::types::{FoodAnalysisResult, FoodItem, NutritionTotals};
use crate::error::{AppError, AppResult};

/// Shape the model is asked for; totals may be missing and get repaired.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    foods: Vec<FoodItem>,
    total_calories: Option<f64>,
    total_protein: Option<f64>,
    total_carbs: Option<f64>,
    total_fat: Option<f64>,
    #[serde(default)]
    analysis: String,
    #[serde(default)]
    recommendations: Option<String>,
}

/// Returns the body of the first Markdown code fence (with or without a
/// language tag), or the trimmed input when there is none.
pub fn strip_code_fence(raw: &str) -> &str {
    lazy_static! {
        static ref FENCED: Regex =
            Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\r?\n?```").unwrap();
    }
    match FENCED.captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => raw.trim(),
    }
}

pub fn parse_analysis(raw: &str) -> AppResult<FoodAnalysisResult> {
    let body = strip_code_fence(raw);
    let parsed: RawAnalysis = serde_json::from_str(body)
        .map_err(|e| AppError::data_format(e.to_string(), raw))?;
    validate(parsed, raw)
}

fn validate(parsed: RawAnalysis, raw: &str) -> AppResult<FoodAnalysisResult> {
    for (i, food) in parsed.foods.iter().enumerate() {
        for (field, value) in item_quantities(food) {
            if let Some(msg) = quantity_error(value, &format!("foods[{i}].{field}")) {
                return Err(AppError::data_format(msg, raw));
            }
        }
    }

    let foods: Vec<FoodItem> = parsed
        .foods
        .into_iter()
        .map(|f| FoodItem {
            name: f.name.trim().to_string(),
            portion: f.portion.trim().to_string(),
            ..f
        })
        .collect();

    let sums = NutritionTotals::sum_of(&foods);
    let mut warnings = Vec::new();

    let mut total = |provided: Option<f64>, summed: f64, label: &str, floor: f64| -> AppResult<f64> {
        match provided {
            Some(v) => {
                if let Some(msg) = quantity_error(v, label) {
                    return Err(AppError::data_format(msg, raw));
                }
                if !foods.is_empty() && diverges(v, summed, floor) {
                    warnings.push(divergence_warning(label, v, summed));
                }
                Ok(v)
            }
            None => {
                warnings.push(format!("{label} missing; computed from listed foods"));
                Ok(summed)
            }
        }
    };

    let total_calories = total(parsed.total_calories, sums.calories, "totalCalories", 25.0)?;
    let total_protein = total(parsed.total_protein, sums.protein, "totalProtein", 5.0)?;
    let total_carbs = total(parsed.total_carbs, sums.carbs, "totalCarbs", 5.0)?;
    let total_fat = total(parsed.total_fat, sums.fat, "totalFat", 5.0)?;

    if foods.is_empty() && total_calories > 0.0 {
        warnings.push("totals reported without any identified foods".to_string());
    }

    Ok(FoodAnalysisResult {
        foods,
        total_calories,
        total_protein,
        total_carbs,
        total_fat,
        analysis: parsed.analysis.trim().to_string(),
        recommendations: parsed
            .recommendations
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty()),
        warnings,
    })
}

/// Re-checks a result that arrives from a client rather than from the parser.
///
/// Every quantity must be finite and non-negative; totals that drift from the
/// itemised sums are reported as warnings.
pub fn validate_result(result: &FoodAnalysisResult) -> AppResult<Vec<String>> {
    for (i, food) in result.foods.iter().enumerate() {
        for (field, value) in item_quantities(food) {
            if let Some(msg) = quantity_error(value, &format!("foods[{i}].{field}")) {
                return Err(AppError::Validation(msg));
            }
        }
    }

    let sums = NutritionTotals::sum_of(&result.foods);
    let mut warnings = Vec::new();
    for (label, provided, summed, floor) in [
        ("totalCalories", result.total_calories, sums.calories, 25.0),
        ("totalProtein", result.total_protein, sums.protein, 5.0),
        ("totalCarbs", result.total_carbs, sums.carbs, 5.0),
        ("totalFat", result.total_fat, sums.fat, 5.0),
    ] {
        if let Some(msg) = quantity_error(provided, label) {
            return Err(AppError::Validation(msg));
        }
        if !result.foods.is_empty() && diverges(provided, summed, floor) {
            warnings.push(divergence_warning(label, provided, summed));
        }
    }
    if result.foods.is_empty() && result.total_calories > 0.0 {
        warnings.push("totals reported without any identified foods".to_string());
    }
    Ok(warnings)
}

fn item_quantities(food: &FoodItem) -> [(&'static str, f64); 4] {
    [
        ("calories", food.calories),
        ("protein", food.protein),
        ("carbs", food.carbs),
        ("fat", food.fat),
    ]
}

fn quantity_error(value: f64, label: &str) -> Option<String> {
    (!value.is_finite() || value < 0.0)
        .then(|| format!("{label} must be a non-negative number, got {value}"))
}

fn divergence_warning(label: &str, provided: f64, summed: f64) -> String {
    format!("{label} ({provided}) differs from the sum of listed foods ({summed:.1})")
}

/// Tolerance is 10 % of the itemised sum, but never below `floor`.
fn diverges(provided: f64, summed: f64, floor: f64) -> bool {
    let tolerance = (summed * 0.10).max(floor);
    (provided - summed).abs() > tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "foods": [
            {"name": "Grilled chicken", "portion": "150 g", "calories": 250, "protein": 46, "carbs": 0, "fat": 5},
            {"name": "White rice", "portion": "1 cup", "calories": 200, "protein": 4, "carbs": 45, "fat": 0.5}
        ],
        "totalCalories": 450,
        "totalProtein": 50,
        "totalCarbs": 45,
        "totalFat": 5.5,
        "analysis": "Balanced plate, high in protein."
    }"#;

    #[test]
    fn fenced_and_unfenced_parse_identically() {
        let plain = parse_analysis(PAYLOAD).unwrap();
        let fenced = parse_analysis(&format!("```json\n{PAYLOAD}\n```")).unwrap();
        let bare_fence = parse_analysis(&format!("```\n{PAYLOAD}\n```")).unwrap();
        assert_eq!(plain, fenced);
        assert_eq!(plain, bare_fence);
        assert_eq!(plain.total_calories, 450.0);
        assert_eq!(plain.foods.len(), 2);
        assert!(plain.recommendations.is_none());
        assert!(plain.warnings.is_empty());
    }

    #[test]
    fn strip_leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fence("  {\"a\": 1}\n"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}```"), "{\"a\": 1}");
    }

    #[test]
    fn fence_after_leading_prose_is_found() {
        let reply = format!("Here is the analysis:\n```json\n{PAYLOAD}\n```\nEnjoy!");
        assert_eq!(parse_analysis(&reply).unwrap(), parse_analysis(PAYLOAD).unwrap());
    }

    #[test]
    fn truncated_json_is_a_data_format_error_with_raw_text() {
        let truncated = &PAYLOAD[..PAYLOAD.len() / 2];
        match parse_analysis(truncated) {
            Err(AppError::DataFormat { raw, .. }) => assert_eq!(raw, truncated),
            other => panic!("expected DataFormat, got {other:?}"),
        }
    }

    #[test]
    fn prose_reply_is_rejected_not_defaulted() {
        let reply = "Sorry, I cannot identify any food in this image.";
        assert!(matches!(
            parse_analysis(reply),
            Err(AppError::DataFormat { .. })
        ));
    }

    #[test]
    fn negative_quantities_are_rejected() {
        let bad = PAYLOAD.replace("\"fat\": 5}", "\"fat\": -5}");
        let err = parse_analysis(&bad).unwrap_err();
        assert!(err.to_string().contains("foods[0].fat"));
    }

    #[test]
    fn inconsistent_totals_are_kept_but_flagged() {
        let off = PAYLOAD.replace("\"totalCalories\": 450", "\"totalCalories\": 900");
        let result = parse_analysis(&off).unwrap();
        assert_eq!(result.total_calories, 900.0);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("totalCalories"));
    }

    #[test]
    fn small_divergence_is_tolerated() {
        let close = PAYLOAD.replace("\"totalCalories\": 450", "\"totalCalories\": 470");
        assert!(parse_analysis(&close).unwrap().warnings.is_empty());
    }

    #[test]
    fn missing_totals_are_repaired_from_items() {
        let no_fat = PAYLOAD.replace("\"totalFat\": 5.5,", "");
        let result = parse_analysis(&no_fat).unwrap();
        assert_eq!(result.total_fat, 5.5);
        assert!(result.warnings.iter().any(|w| w.contains("totalFat missing")));
    }

    #[test]
    fn submitted_results_are_checked_like_parsed_ones() {
        let parsed = parse_analysis(PAYLOAD).unwrap();
        assert!(validate_result(&parsed).unwrap().is_empty());

        let mut negative = parsed.clone();
        negative.foods[0].calories = -500.0;
        negative.foods[0].protein = -1.0;
        let err = validate_result(&negative).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("foods[0].calories")));

        let mut inflated = parsed.clone();
        inflated.total_calories = 900.0;
        let warnings = validate_result(&inflated).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("totalCalories"));

        let mut bad_total = parsed;
        bad_total.total_fat = f64::NAN;
        assert!(matches!(
            validate_result(&bad_total),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn empty_recommendations_become_none() {
        let with_blank = PAYLOAD.replace(
            "\"analysis\": \"Balanced plate, high in protein.\"",
            "\"analysis\": \"ok\", \"recommendations\": \"  \"",
        );
        assert!(parse_analysis(&with_blank).unwrap().recommendations.is_none());
    }
}
