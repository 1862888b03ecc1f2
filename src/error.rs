use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure kinds surfaced by the pipelines and handlers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Required input missing or out of range; rejected before any external call.
    #[error("{0}")]
    Validation(String),

    /// A credential or setting the operation needs is absent.
    #[error("{0}")]
    Configuration(String),

    /// The model provider rejected the configured credential.
    #[error("model provider rejected the API credential: {0}")]
    UpstreamAuth(String),

    /// The model replied with something that is not the structured payload we asked for.
    #[error("model response is not valid structured data: {message}")]
    DataFormat { message: String, raw: String },

    /// Timeouts, connection failures, rate limits and 5xx responses.
    #[error("temporary upstream failure: {0}")]
    TransientUpstream(String),

    #[error("upstream failure: {0}")]
    Upstream(String),

    /// Missing or invalid bearer token.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn data_format(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::DataFormat {
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// Only transient failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientUpstream(_))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamAuth(_) => StatusCode::UNAUTHORIZED,
            Self::DataFormat { .. } => StatusCode::BAD_GATEWAY,
            Self::TransientUpstream(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text shown to the end user. Internal details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg) => msg.clone(),
            Self::Configuration(msg) => format!("Service misconfigured: {msg}"),
            Self::UpstreamAuth(_) => "The AI provider rejected our credentials. \
                Verify that OPENAI_API_KEY is set to a valid key."
                .to_string(),
            Self::DataFormat { .. } => "Could not read the AI analysis result".to_string(),
            Self::TransientUpstream(_) => {
                "The AI service is temporarily unavailable, please try again".to_string()
            }
            Self::Upstream(_) => "The AI service failed to process the request".to_string(),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, %status, "request failed");
        } else {
            tracing::warn!(error = %self, %status, "request rejected");
        }

        let body = match &self {
            Self::DataFormat { raw, .. } => json!({
                "error": self.user_message(),
                "rawContent": raw,
            }),
            _ => json!({ "error": self.user_message() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

pub type AppResult<T> = Result<T, AppError>;
