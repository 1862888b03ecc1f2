//! OpenAI-compatible `chat/completions` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{CompletionRequest, ImageDetail, LanguageModel};
use crate::{
    config::LlmConfig,
    error::{AppError, AppResult},
};

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: ApiContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ApiContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
    detail: ImageDetail,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(cfg: &LlmConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(cfg.timeout_secs);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            api_key: cfg.api_key.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            timeout,
        })
    }

    fn build_body<'a>(&'a self, req: &'a CompletionRequest) -> ApiRequest<'a> {
        let user_content = match &req.image {
            None => ApiContent::Text(&req.user_text),
            Some(image) => ApiContent::Parts(vec![
                ContentPart::Text {
                    text: &req.user_text,
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: &image.url,
                        detail: image.detail,
                    },
                },
            ]),
        };
        ApiRequest {
            model: &self.model,
            messages: vec![
                ApiMessage {
                    role: "system",
                    content: ApiContent::Text(&req.system),
                },
                ApiMessage {
                    role: "user",
                    content: user_content,
                },
            ],
            temperature: req.temperature,
            max_tokens: req.max_tokens,
        }
    }

    async fn send(&self, api_key: &str, body: &ApiRequest<'_>) -> AppResult<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(classify_status(status, &text));
        }

        let parsed: ApiResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, "unparseable completion envelope");
            AppError::Upstream(format!("unparseable completion envelope: {e}"))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Upstream("completion returned no choices".into()))?;

        let content = choice.message.content.unwrap_or_default();
        debug!(
            chars = content.len(),
            finish_reason = ?choice.finish_reason,
            "completion received"
        );
        Ok(content)
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    #[instrument(skip(self, request), fields(model = %self.model, has_image = request.image.is_some()))]
    async fn complete(&self, request: &CompletionRequest) -> AppResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Configuration("OPENAI_API_KEY is not configured".into()))?;

        let body = self.build_body(request);
        match tokio::time::timeout(self.timeout, self.send(api_key, &body)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::TransientUpstream(format!(
                "model call timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

fn transport_error(e: reqwest::Error) -> AppError {
    error!(error = %e, "model request failed");
    if e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() {
        AppError::TransientUpstream(e.to_string())
    } else {
        AppError::Upstream(e.to_string())
    }
}

/// Maps a non-success provider response onto the error taxonomy.
fn classify_status(status: StatusCode, body: &str) -> AppError {
    let detail = serde_json::from_str::<ApiErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::UpstreamAuth(detail),
        StatusCode::TOO_MANY_REQUESTS | StatusCode::REQUEST_TIMEOUT => {
            AppError::TransientUpstream(format!("{status}: {detail}"))
        }
        s if s.is_server_error() => AppError::TransientUpstream(format!("{status}: {detail}")),
        _ => AppError::Upstream(format!("{status}: {detail}")),
    }
}
