//! Language-model boundary: one chat-completion call, optionally with an image.

pub mod openai;
pub mod retry;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppResult;

pub use openai::OpenAiClient;
pub use retry::RetryPolicy;

/// Vision detail hint; food photos are always sent at full resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    High,
}

#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Data URI or publicly reachable URL.
    pub url: String,
    pub detail: ImageDetail,
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user_text: String,
    pub image: Option<ImageInput>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn text(system: impl Into<String>, user_text: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user_text: user_text.into(),
            image: None,
            temperature: 0.7,
            max_tokens: 1000,
        }
    }

    pub fn with_image(mut self, image: ImageInput) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the assistant's text. An empty string means the model produced no content.
    ///
    /// Errors are classified: `Configuration` when no credential is set,
    /// `UpstreamAuth` when the provider rejects it, `TransientUpstream` for
    /// timeouts/connectivity/429/5xx, `Upstream` for anything else.
    async fn complete(&self, request: &CompletionRequest) -> AppResult<String>;
}
