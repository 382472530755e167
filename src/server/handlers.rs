// HTTP request handlers

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use super::AppServer;
use crate::coach::CoachReply;
use crate::conversation::ChatMessage;
use crate::crisis::{helplines_for, ClassificationResult, Helpline, DEFAULT_COUNTRY};
use crate::store::{SosEvent, SosLevel};

/// Default number of messages returned by the history endpoint
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
/// Largest history page a caller may request
pub const MAX_HISTORY_LIMIT: usize = 100;

/// Create the main application router
pub fn create_router(server: Arc<AppServer>) -> Router {
    Router::new()
        // Chat
        .route("/v1/chat/messages", post(send_message))
        .route("/v1/chat/messages/:user_id", get(get_messages))
        .route("/v1/chat/analyze", post(analyze_message))
        // SOS
        .route("/v1/sos/trigger", post(trigger_sos))
        .route("/v1/sos/events/:user_id", get(get_sos_events))
        .route("/v1/sos/helplines", get(get_helplines))
        // Health and metrics
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .with_state(server)
}

/// Success envelope shared by every JSON endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub user_id: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct TriggerSosRequest {
    pub user_id: String,
    pub level: SosLevel,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct HelplineQuery {
    pub country: Option<String>,
}

/// Handle POST /v1/chat/messages - classify, store and reply
async fn send_message(
    State(server): State<Arc<AppServer>>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CoachReply>>, ApiError> {
    let Json(request) = payload?;
    validate_user_id(&request.user_id)?;
    validate_content(&request.content, server.max_message_chars())?;

    let reply = server
        .coach()
        .respond(&request.user_id, &request.content)
        .await;

    Ok(ApiResponse::ok(reply))
}

/// Handle GET /v1/chat/messages/:user_id - recent history, oldest first
async fn get_messages(
    State(server): State<Arc<AppServer>>,
    Path(user_id): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, ApiError> {
    let Query(query) = query?;
    validate_user_id(&user_id)?;

    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if limit == 0 || limit > MAX_HISTORY_LIMIT {
        return Err(ApiError::Validation(format!(
            "limit must be between 1 and {}",
            MAX_HISTORY_LIMIT
        )));
    }

    let messages = server.coach().store().recent_messages(&user_id, limit)?;
    Ok(ApiResponse::ok(messages))
}

/// Handle POST /v1/chat/analyze - classification only, nothing stored
async fn analyze_message(
    State(server): State<Arc<AppServer>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ClassificationResult>>, ApiError> {
    let Json(request) = payload?;
    validate_content(&request.content, server.max_message_chars())?;
    Ok(ApiResponse::ok(server.coach().analyze(&request.content)))
}

/// Handle POST /v1/sos/trigger - record a manual SOS event
async fn trigger_sos(
    State(server): State<Arc<AppServer>>,
    payload: Result<Json<TriggerSosRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SosEvent>>, ApiError> {
    let Json(request) = payload?;
    validate_user_id(&request.user_id)?;

    let event = SosEvent::manual(&request.user_id, request.level);
    server.coach().store().record_sos_event(event.clone())?;
    server
        .coach()
        .metrics()
        .record_sos_event(event.level.as_str(), "manual");

    Ok(ApiResponse::ok(event))
}

/// Handle GET /v1/sos/events/:user_id - newest first
async fn get_sos_events(
    State(server): State<Arc<AppServer>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<SosEvent>>>, ApiError> {
    validate_user_id(&user_id)?;
    let events = server.coach().store().sos_events(&user_id)?;
    Ok(ApiResponse::ok(events))
}

/// Handle GET /v1/sos/helplines
async fn get_helplines(
    query: Result<Query<HelplineQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<&'static [Helpline]>>, ApiError> {
    let Query(query) = query?;
    let country = query.country.as_deref().unwrap_or(DEFAULT_COUNTRY);
    Ok(ApiResponse::ok(helplines_for(country)))
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: String,
}

/// Handle GET /health - Health check endpoint
pub async fn health_check(State(server): State<Arc<AppServer>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: server.uptime_seconds(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Handle GET /metrics - Prometheus metrics endpoint
pub async fn metrics_endpoint(State(server): State<Arc<AppServer>>) -> Result<Response, ApiError> {
    let body = server.coach().metrics().render()?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

fn validate_user_id(user_id: &str) -> Result<(), ApiError> {
    if user_id.trim().is_empty() {
        return Err(ApiError::Validation("user_id is required".to_string()));
    }
    Ok(())
}

fn validate_content(content: &str, max_chars: usize) -> Result<(), ApiError> {
    if content.trim().is_empty() {
        return Err(ApiError::Validation("Message cannot be empty".to_string()));
    }
    if content.chars().count() > max_chars {
        return Err(ApiError::Validation(format!(
            "Message too long (max {} characters)",
            max_chars
        )));
    }
    Ok(())
}

/// Errors returned by handlers, rendered as `{success: false, error: {...}}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::Internal(_) => "api_error",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(format!("Invalid query: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = serde_json::json!({
            "success": false,
            "error": {
                "message": self.to_string(),
                "type": self.error_type()
            }
        });

        (status, Json(body)).into_response()
    }
}
