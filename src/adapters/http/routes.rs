//! HTTP route assembly for the hub server.

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::ws::ws_handler;
use super::AppState;

/// Builds the application router.
///
/// Two routes only: the upgrade endpoint and a liveness probe. The CRUD
/// surface of the platform lives in its own service.
pub fn app(state: AppState, cors_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Liveness probe reporting the online connection gauge.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "online_connections": state.hub.online_count(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockSessionValidator;
    use crate::adapters::persistence::InMemoryMessageLog;
    use crate::application::hub::Hub;
    use crate::config::HubConfig;
    use std::sync::Arc;

    fn test_state() -> AppState {
        AppState {
            hub: Hub::spawn(),
            validator: Arc::new(MockSessionValidator::new()),
            message_log: Arc::new(InMemoryMessageLog::new()),
            hub_config: HubConfig::default(),
        }
    }

    #[tokio::test]
    async fn app_builds_with_and_without_cors_origins() {
        let _ = app(test_state(), &[]);
        let _ = app(
            test_state(),
            &["http://localhost:5173".to_string(), "bad origin".to_string()],
        );
    }

    #[tokio::test]
    async fn health_reports_online_gauge() {
        let state = test_state();
        let Json(body) = health(State(state)).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["online_connections"], 0);
    }
}
