use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How much visual ambiguity the model is told to tolerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionPolicy {
    /// Ask for precise identification only.
    Strict,
    /// Always estimate, and flag low confidence in the analysis text.
    Lenient,
}

impl FromStr for ExtractionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => anyhow::bail!("FOOD_ANALYSIS_POLICY must be strict or lenient, got {other}"),
        }
    }
}

const SCHEMA: &str = r#"{
  "foods": [
    {
      "name": "food name",
      "portion": "estimated portion size",
      "calories": number,
      "protein": grams of protein,
      "carbs": grams of carbohydrates,
      "fat": grams of fat
    }
  ],
  "totalCalories": number,
  "totalProtein": grams,
  "totalCarbs": grams,
  "totalFat": grams,
  "analysis": "detailed nutritional analysis of the plate",
  "recommendations": "how to improve the meal (optional)"
}"#;

const ROLE: &str = "You are a registered dietitian specialised in nutritional analysis of food photos. \
You identify foods and portion sizes, compute calories and macronutrients \
(protein, carbohydrates, fat) using standard food composition data, and comment \
on the nutritional quality of the meal.";

const STRICT_RULES: &str = "Identify every visible food precisely and estimate portions carefully. \
Only list foods you can identify with confidence.";

const LENIENT_RULES: &str = "Even if the photo is blurry, dark, partially cropped or ambiguous, \
always give your best estimate for every food you can make out. When image quality \
limits your confidence, say so explicitly in the \"analysis\" text.";

const OUTPUT_RULES: &str = "Reply with a single JSON object and nothing else, exactly in this shape. \
All numeric fields are plain numbers without units. \"recommendations\" may be omitted.";

pub fn system_prompt(policy: ExtractionPolicy) -> String {
    let rules = match policy {
        ExtractionPolicy::Strict => STRICT_RULES,
        ExtractionPolicy::Lenient => LENIENT_RULES,
    };
    format!("{ROLE}\n\n{rules}\n\n{OUTPUT_RULES}\n{SCHEMA}")
}

pub fn user_instruction(policy: ExtractionPolicy) -> &'static str {
    match policy {
        ExtractionPolicy::Strict => {
            "Analyse this photo of a meal and return a complete and precise nutritional analysis."
        }
        ExtractionPolicy::Lenient => {
            "Analyse this photo of a meal and return your best nutritional estimate, \
             noting any uncertainty caused by the image."
        }
    }
}
