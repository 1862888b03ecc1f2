use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{analysis, calories, chat, profiles, weights, workouts};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(chat::router())
                .merge(analysis::router())
                .merge(calories::router())
                .merge(profiles::router())
                .merge(workouts::router())
                .merge(weights::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bearer_for, ScriptedModel};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn call(
        state: &AppState,
        method: Method,
        uri: &str,
        auth: Option<String>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            req = req.header(header::AUTHORIZATION, auth);
        }
        let req = match body {
            Some(b) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();

        let res = build_app(state.clone()).oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    #[tokio::test]
    async fn health_needs_no_token() {
        let state = AppState::fake();
        let (status, body) = call(&state, Method::GET, "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("ok".into()));
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let state = AppState::fake();
        let (status, body) = call(&state, Method::GET, "/api/profile", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], json!("Missing Authorization header"));

        let (status, body) = call(
            &state,
            Method::GET,
            "/api/profile",
            Some("Bearer not-a-jwt".into()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn missing_user_id_is_a_bad_request_with_json_error() {
        let model = Arc::new(ScriptedModel::new());
        let state = AppState::fake_with_model(model.clone());
        let auth = Some(bearer_for(&state, Uuid::new_v4()));

        for (uri, body) in [
            ("/api/chat", json!({ "message": "hi" })),
            ("/api/analyze-food", json!({ "imageUrl": "https://x.test/plate.jpg" })),
        ] {
            let (status, body) = call(&state, Method::POST, uri, auth.clone(), Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"].as_str().unwrap().contains("userId"), "{uri}");
        }
        assert_eq!(model.request_count().await, 0);
    }

    #[tokio::test]
    async fn malformed_query_is_a_bad_request_with_json_error() {
        let state = AppState::fake();
        let auth = Some(bearer_for(&state, Uuid::new_v4()));
        let (status, body) = call(&state, Method::GET, "/api/workouts?days=soon", auth, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn negative_food_values_are_refused_by_the_merge() {
        let state = AppState::fake();
        let me = Uuid::new_v4();
        let auth = Some(bearer_for(&state, me));
        let result = json!({
            "foods": [{ "name": "Cake", "portion": "1 slice", "calories": -500, "protein": -1, "carbs": 30, "fat": 10 }],
            "totalCalories": 10, "totalProtein": 0, "totalCarbs": 30, "totalFat": 10,
            "analysis": "?"
        });

        let (status, body) = call(
            &state,
            Method::POST,
            "/api/calories/meals",
            auth.clone(),
            Some(json!({ "userId": me, "date": "2026-10-19", "result": result })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("foods[0].calories"));

        let (status, _) = call(&state, Method::GET, "/api/calories/2026-10-19", auth, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn body_user_must_match_token() {
        let state = AppState::fake();
        let me = Uuid::new_v4();
        let (status, body) = call(
            &state,
            Method::POST,
            "/api/chat",
            Some(bearer_for(&state, me)),
            Some(json!({ "message": "hi", "userId": Uuid::new_v4() })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn analyze_food_returns_data_or_raw_content() {
        let model = Arc::new(ScriptedModel::new());
        model
            .push_reply(r#"{"foods":[],"totalCalories":0,"totalProtein":0,"totalCarbs":0,"totalFat":0,"analysis":"No food visible."}"#)
            .await;
        model.push_reply("I think this is a salad").await;
        let state = AppState::fake_with_model(model);
        let me = Uuid::new_v4();
        let auth = Some(bearer_for(&state, me));

        let (status, body) = call(
            &state,
            Method::POST,
            "/api/analyze-food",
            auth.clone(),
            Some(json!({ "imageUrl": "https://x.test/plate.jpg", "userId": me })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["analysis"], json!("No food visible."));

        let (status, body) = call(
            &state,
            Method::POST,
            "/api/analyze-food",
            auth,
            Some(json!({ "imageReference": "https://x.test/plate.jpg", "userId": me })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["rawContent"], json!("I think this is a salad"));
    }

    #[tokio::test]
    async fn analyze_food_without_image_is_bad_request() {
        let state = AppState::fake();
        let me = Uuid::new_v4();
        let (status, _) = call(
            &state,
            Method::POST,
            "/api/analyze-food",
            Some(bearer_for(&state, me)),
            Some(json!({ "userId": me })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn meals_merge_into_the_daily_ledger() {
        let state = AppState::fake();
        let me = Uuid::new_v4();
        let auth = Some(bearer_for(&state, me));
        let result = |kcal: u32| {
            json!({
                "foods": [{ "name": "Rice", "portion": "1 cup", "calories": kcal, "protein": 4, "carbs": 45, "fat": 0.5 }],
                "totalCalories": kcal, "totalProtein": 4, "totalCarbs": 45, "totalFat": 0.5,
                "analysis": "ok"
            })
        };

        for kcal in [450, 300] {
            let (status, _) = call(
                &state,
                Method::POST,
                "/api/calories/meals",
                auth.clone(),
                Some(json!({ "userId": me, "date": "2026-10-19", "result": result(kcal) })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = call(&state, Method::GET, "/api/calories/2026-10-19", auth.clone(), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["caloriesConsumed"], json!(750.0));
        assert_eq!(body["meals"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["meals"][0]["totalCalories"], json!(450.0));
        assert!(body.get("calories_consumed").is_none());

        let (status, _) = call(&state, Method::GET, "/api/calories/2026-10-18", auth.clone(), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&state, Method::GET, "/api/calories/yesterday", auth, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn skip_then_fetch_profile() {
        let state = AppState::fake();
        let me = Uuid::new_v4();
        let auth = Some(bearer_for(&state, me));
        let (status, _) = call(
            &state,
            Method::POST,
            "/api/profile/skip",
            auth.clone(),
            Some(json!({ "userId": me })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&state, Method::GET, "/api/profile", auth, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["workoutLevel"], json!("beginner"));
        assert_eq!(body["onboardingCompleted"], json!(false));
    }

    #[tokio::test]
    async fn workout_and_weight_windows_are_validated() {
        let state = AppState::fake();
        let me = Uuid::new_v4();
        let auth = Some(bearer_for(&state, me));

        let (status, _) = call(
            &state,
            Method::POST,
            "/api/workouts",
            auth.clone(),
            Some(json!({ "userId": me, "title": "Run", "level": "easy", "duration": 30, "caloriesBurned": 280 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = call(&state, Method::GET, "/api/workouts", auth.clone(), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));

        let (status, _) = call(&state, Method::GET, "/api/weights?days=0", auth, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chat_returns_the_model_reply() {
        let model = Arc::new(ScriptedModel::new());
        model.push_reply("Keep it up!").await;
        let state = AppState::fake_with_model(model);
        let me = Uuid::new_v4();
        let (status, body) = call(
            &state,
            Method::POST,
            "/api/chat",
            Some(bearer_for(&state, me)),
            Some(json!({ "message": "How was my week?", "userId": me })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], json!("Keep it up!"));
    }
}
