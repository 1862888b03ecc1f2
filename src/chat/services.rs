use time::OffsetDateTime;
use tracing::{instrument, warn};
use uuid::Uuid;

use super::context::build_user_context;
use crate::{
    error::{AppError, AppResult},
    llm::CompletionRequest,
    state::AppState,
};

pub const FALLBACK_REPLY: &str = "Sorry, I couldn't process your message. Please try again.";

pub fn coach_system_prompt(user_context: &str) -> String {
    format!(
        "You are a virtual nutrition assistant and personal trainer specialised in health and fitness.

USER DATA:
{user_context}

YOUR RESPONSIBILITIES:
- Give nutrition guidance tailored to the user's profile
- Suggest healthy, balanced meals
- Recommend workouts suited to the user's level
- Review progress and give motivating feedback
- Answer questions about food, exercise and health
- Be empathetic, encouraging and professional

GUIDELINES:
- Use the user data to personalise your answers
- Be specific and practical
- Respect dietary restrictions and health conditions
- Encourage healthy habits in a positive way
- If the data is insufficient, ask the user for more information"
    )
}

/// Answers one coaching message using the caller's own history as context.
///
/// Missing credentials and rejected credentials are returned as errors so the
/// operator can fix them; any other model failure becomes a polite fallback.
#[instrument(skip(state, message), fields(user_id = %user_id))]
pub async fn reply(state: &AppState, user_id: Uuid, message: &str) -> AppResult<String> {
    let message = message.trim();
    if message.is_empty() {
        return Err(AppError::validation("message is required"));
    }

    let context = build_user_context(
        state.store.as_ref(),
        user_id,
        OffsetDateTime::now_utc(),
        state.config.context_max_chars,
    )
    .await;
    let request = CompletionRequest::text(coach_system_prompt(&context), message);

    let llm = state.llm.as_ref();
    let req = &request;
    match state
        .retry_policy()
        .run("chat", move || llm.complete(req))
        .await
    {
        Ok(text) if !text.trim().is_empty() => Ok(text),
        Ok(_) => {
            warn!("model returned empty chat reply");
            Ok(FALLBACK_REPLY.to_string())
        }
        Err(e @ (AppError::Configuration(_) | AppError::UpstreamAuth(_))) => Err(e),
        Err(e) => {
            warn!(error = %e, "chat completion failed, sending fallback");
            Ok(FALLBACK_REPLY.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedModel;
    use std::sync::Arc;

    #[tokio::test]
    async fn context_is_embedded_and_sampling_matches_chat() {
        let model = Arc::new(ScriptedModel::new());
        model.push_reply("Drink more water.").await;
        let state = AppState::fake_with_model(model.clone());

        let answer = reply(&state, Uuid::new_v4(), "How am I doing?").await.unwrap();
        assert_eq!(answer, "Drink more water.");

        let requests = model.requests.lock().await;
        let sent = &requests[0];
        assert!(sent.system.contains("USER DATA:\nPROFILE: The user has not completed"));
        assert_eq!(sent.user_text, "How am I doing?");
        assert!(sent.image.is_none());
        assert_eq!(sent.temperature, 0.7);
        assert_eq!(sent.max_tokens, 1000);
    }

    #[tokio::test]
    async fn empty_reply_becomes_fallback() {
        let model = Arc::new(ScriptedModel::new());
        model.push_reply("  ").await;
        let state = AppState::fake_with_model(model);
        let answer = reply(&state, Uuid::new_v4(), "hi").await.unwrap();
        assert_eq!(answer, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn persistent_outage_becomes_fallback_after_retries() {
        let model = Arc::new(ScriptedModel::new());
        for _ in 0..3 {
            model
                .push_error(AppError::TransientUpstream("timeout".into()))
                .await;
        }
        let state = AppState::fake_with_model(model.clone());
        let answer = reply(&state, Uuid::new_v4(), "hi").await.unwrap();
        assert_eq!(answer, FALLBACK_REPLY);
        assert_eq!(model.request_count().await, 3);
    }

    #[tokio::test]
    async fn credential_problems_are_errors() {
        let model = Arc::new(ScriptedModel::new());
        model.push_error(AppError::UpstreamAuth("401".into())).await;
        model
            .push_error(AppError::Configuration("OPENAI_API_KEY is not set".into()))
            .await;
        let state = AppState::fake_with_model(model);

        let first = reply(&state, Uuid::new_v4(), "hi").await.unwrap_err();
        assert!(matches!(first, AppError::UpstreamAuth(_)));
        let second = reply(&state, Uuid::new_v4(), "hi").await.unwrap_err();
        assert!(matches!(second, AppError::Configuration(_)));
    }

    #[tokio::test]
    async fn blank_message_is_rejected_before_model_call() {
        let model = Arc::new(ScriptedModel::new());
        let state = AppState::fake_with_model(model.clone());
        let err = reply(&state, Uuid::new_v4(), " \n").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(model.request_count().await, 0);
    }
}
