//! Shared fixtures for unit tests.

use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    analysis::prompts::ExtractionPolicy,
    auth::jwt::issue_token,
    config::{AppConfig, FoodAnalysisConfig, JwtConfig, LlmConfig},
    error::{AppError, AppResult},
    llm::{CompletionRequest, LanguageModel},
    state::AppState,
    storage::MemoryStore,
};

/// Language model that replays queued replies and records every request.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<AppResult<String>>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().await.push_back(Ok(reply.into()));
    }

    pub async fn push_error(&self, err: AppError) {
        self.replies.lock().await.push_back(Err(err));
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: &CompletionRequest) -> AppResult<String> {
        self.requests.lock().await.push(request.clone());
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Upstream("no scripted reply".into())))
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: None,
        jwt: JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
        },
        llm: LlmConfig {
            api_key: Some("test-key".into()),
            base_url: "http://127.0.0.1:9/v1".into(),
            model: "test-model".into(),
            timeout_secs: 5,
            max_retries: 2,
            retry_base_ms: 1,
        },
        food: FoodAnalysisConfig {
            policy: ExtractionPolicy::Strict,
            temperature: 0.3,
            max_tokens: 1500,
            default_calorie_goal: 2000,
        },
        context_max_chars: 6000,
    }
}

impl AppState {
    pub fn fake() -> Self {
        Self::fake_with_model(Arc::new(ScriptedModel::new()))
    }

    pub fn fake_with_model(model: Arc<ScriptedModel>) -> Self {
        Self::from_parts(
            Arc::new(test_config()),
            Arc::new(MemoryStore::new()),
            model,
        )
    }
}

/// `Authorization` header value for `user_id` signed with the fake state's secret.
pub fn bearer_for(state: &AppState, user_id: Uuid) -> String {
    let token = issue_token(&state.config.jwt, user_id, time::Duration::minutes(5));
    format!("Bearer {token}")
}
