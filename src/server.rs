//! HTTP surface for the tutoring session
//!
//! Thin axum layer over the session controller. Routes mirror the
//! frontend contract: health probe, history fetch/clear, and the chat
//! endpoint.

use crate::llm::{Language, ModelId};
use crate::session::SessionController;
use crate::transcript::Turn;
use crate::ParloError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SessionController>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    gateway: &'static str,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    messages: Vec<Turn>,
}

#[derive(Debug, Serialize)]
struct ClearResponse {
    success: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    message: String,

    #[serde(default)]
    language: Language,

    /// Unrecognized model names deserialize to the default model
    #[serde(default)]
    model: Option<ModelId>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    history: Vec<Turn>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_secs: Option<u64>,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/history", get(get_history).delete(clear_history))
        .route("/chat", post(chat))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let gateway = if state.controller.gateway_connected() {
        "connected"
    } else {
        "disconnected"
    };
    Json(HealthResponse {
        status: "ok",
        gateway,
    })
}

async fn get_history(State(state): State<AppState>) -> impl IntoResponse {
    Json(HistoryResponse {
        messages: state.controller.history(),
    })
}

async fn clear_history(State(state): State<AppState>) -> impl IntoResponse {
    match state.controller.clear_history() {
        Ok(()) => Json(ClearResponse { success: true }).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    match state
        .controller
        .send_message(&request.message, request.language, request.model)
        .await
    {
        Ok(outcome) => Json(ChatResponse {
            response: outcome.response,
            history: outcome.history,
        })
        .into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

fn error_response(error: &ParloError) -> (StatusCode, Json<ErrorBody>) {
    let (status, retry_after_secs) = match error {
        ParloError::EmptyMessage => (StatusCode::BAD_REQUEST, None),
        ParloError::CoolingDown { wait_secs } => {
            (StatusCode::TOO_MANY_REQUESTS, Some(*wait_secs))
        }
        ParloError::Busy => (StatusCode::CONFLICT, None),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, None),
    };

    (
        status,
        Json(ErrorBody {
            error: error.user_message(),
            retry_after_secs,
        }),
    )
}

/// HTTP server with graceful shutdown
pub struct ApiServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
    pub port: u16,
}

impl ApiServer {
    pub fn new(port: u16) -> Self {
        Self {
            shutdown_tx: None,
            port,
        }
    }

    /// Bind and serve on a background task
    pub fn start(&mut self, controller: Arc<SessionController>) {
        let port = self.port;
        let (tx, rx) = oneshot::channel();
        self.shutdown_tx = Some(tx);

        let app = router(AppState { controller });

        tokio::spawn(async move {
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            info!("Starting API server on {}", addr);

            match TcpListener::bind(addr).await {
                Ok(listener) => {
                    if let Err(e) = axum::serve(listener, app)
                        .with_graceful_shutdown(async {
                            rx.await.ok();
                        })
                        .await
                    {
                        error!("Server error: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to bind server to {}: {}", addr, e);
                }
            }
            info!("API server on port {} stopped", port);
        });
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let (status, _) = error_response(&ParloError::EmptyMessage);
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = error_response(&ParloError::CoolingDown { wait_secs: 14 });
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body.retry_after_secs, Some(14));

        let (status, _) = error_response(&ParloError::Busy);
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = error_response(&ParloError::Gateway("boom".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_chat_request_defaults() {
        let request: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(request.message, "hi");
        assert_eq!(request.language, Language::En);
        assert!(request.model.is_none());
    }

    #[test]
    fn test_chat_request_unknown_model_falls_back() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"message":"hi","language":"de","model":"nope"}"#).unwrap();
        assert_eq!(request.language, Language::De);
        assert_eq!(request.model, Some(ModelId::Gemini25Flash));
    }

    #[test]
    fn test_error_body_omits_absent_retry() {
        let (_, body) = error_response(&ParloError::EmptyMessage);
        let json = serde_json::to_value(&body.0).unwrap();
        assert!(json.get("retry_after_secs").is_none());
        assert_eq!(json["error"], "Message required");
    }
}
