use std::str::FromStr;

use serde::Deserialize;

use crate::analysis::prompts::ExtractionPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// `None` means the key was never configured; calls fail with a configuration error.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FoodAnalysisConfig {
    pub policy: ExtractionPolicy,
    pub temperature: f32,
    pub max_tokens: u32,
    pub default_calorie_goal: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// When absent the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub llm: LlmConfig,
    pub food: FoodAnalysisConfig,
    pub context_max_chars: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "fitcoach".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "fitcoach-users".into()),
        };
        let llm = LlmConfig {
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".into()),
            timeout_secs: env_or("LLM_TIMEOUT_SECS", 60),
            max_retries: env_or("LLM_MAX_RETRIES", 2),
            retry_base_ms: env_or("LLM_RETRY_BASE_MS", 500),
        };
        let policy = match std::env::var("FOOD_ANALYSIS_POLICY") {
            Ok(v) => v.parse::<ExtractionPolicy>()?,
            Err(_) => ExtractionPolicy::Strict,
        };
        let food = FoodAnalysisConfig {
            policy,
            temperature: env_or("FOOD_ANALYSIS_TEMPERATURE", 0.3),
            max_tokens: env_or("FOOD_ANALYSIS_MAX_TOKENS", 1500),
            default_calorie_goal: env_or("DEFAULT_CALORIE_GOAL", 2000),
        };
        Ok(Self {
            database_url,
            jwt,
            llm,
            food,
            context_max_chars: env_or("CONTEXT_MAX_CHARS", 6000),
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
