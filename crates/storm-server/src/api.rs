//! HTTP API for storms.
//!
//! JSON bodies use camelCase. The requester's session handle travels in the
//! `x-storm-session` header.

use crate::error::{Error, Result};
use crate::service::{Joined, SessionView, StormService};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use storm_core::{
    Error as StormError, Idea, IdeaId, Phase, SessionId, StormCode, StormSettings, StormSummary,
    StormView, Vote,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Header carrying the requester's session handle.
pub const SESSION_HEADER: &str = "x-storm-session";

type AppState = Arc<StormService>;

/// A JSON body, or why it could not be read.
type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    // CORS layer for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health (at root and under /api/v1 for compatibility)
        .route("/health", get(health))
        .route("/api/v1/health", get(health))
        // Storms
        .route("/api/v1/storms", get(list_storms).post(create_storm))
        .route("/api/v1/storms/:code", get(get_storm))
        .route("/api/v1/storms/:code/join", post(join_storm))
        .route("/api/v1/storms/:code/advance-phase", post(advance_phase))
        // Ideas and votes
        .route("/api/v1/storms/:code/ideas", post(create_idea))
        .route(
            "/api/v1/storms/:code/ideas/:id",
            put(update_idea).delete(delete_idea),
        )
        .route("/api/v1/storms/:code/ideas/:id/vote", post(submit_vote))
        // Session
        .route("/api/v1/session", get(get_session).delete(leave))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

fn session(headers: &HeaderMap) -> Result<SessionId> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(SessionId::from)
        .ok_or(Error::Storm(StormError::Unauthenticated))
}

// Unreadable bodies are validation errors, not axum's plain-text rejections.
fn payload<T>(body: JsonBody<T>) -> Result<T> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(StormError::Validation(rejection.body_text()).into()),
    }
}

// --- Storm endpoints ---

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    status: Option<String>,
}

async fn list_storms(
    State(service): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<StormSummary>>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<Phase>)
        .transpose()?;
    Ok(Json(service.list_storms(status).await))
}

async fn create_storm(
    State(service): State<AppState>,
    body: JsonBody<StormSettings>,
) -> Result<(StatusCode, Json<Joined>)> {
    let settings = payload(body)?;
    let created = service.create_storm(settings).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_storm(
    State(service): State<AppState>,
    Path(code): Path<String>,
    headers: HeaderMap,
) -> Result<Json<StormView>> {
    let requester = session(&headers)?;
    Ok(Json(service.get_storm(&StormCode::new(code), &requester).await?))
}

#[derive(Debug, Deserialize)]
struct JoinRequest {
    username: String,
}

async fn join_storm(
    State(service): State<AppState>,
    Path(code): Path<String>,
    body: JsonBody<JoinRequest>,
) -> Result<(StatusCode, Json<Joined>)> {
    let req = payload(body)?;
    let joined = service.join_storm(&StormCode::new(code), &req.username).await?;
    Ok((StatusCode::CREATED, Json(joined)))
}

async fn advance_phase(
    State(service): State<AppState>,
    Path(code): Path<String>,
    headers: HeaderMap,
) -> Result<Json<StormView>> {
    let requester = session(&headers)?;
    Ok(Json(service.advance_phase(&StormCode::new(code), &requester).await?))
}

// --- Idea endpoints ---

#[derive(Debug, Deserialize)]
struct CreateIdeaRequest {
    title: String,
    #[serde(default)]
    description: Option<String>,
}

async fn create_idea(
    State(service): State<AppState>,
    Path(code): Path<String>,
    headers: HeaderMap,
    body: JsonBody<CreateIdeaRequest>,
) -> Result<(StatusCode, Json<Idea>)> {
    let requester = session(&headers)?;
    let req = payload(body)?;
    let description = req.description.unwrap_or_default();
    let idea = service
        .create_idea(&StormCode::new(code), &requester, &req.title, &description)
        .await?;
    Ok((StatusCode::CREATED, Json(idea)))
}

#[derive(Debug, Deserialize)]
struct UpdateIdeaRequest {
    title: Option<String>,
    description: Option<String>,
}

async fn update_idea(
    State(service): State<AppState>,
    Path((code, id)): Path<(String, String)>,
    headers: HeaderMap,
    body: JsonBody<UpdateIdeaRequest>,
) -> Result<Json<Idea>> {
    let requester = session(&headers)?;
    let req = payload(body)?;
    let idea = service
        .update_idea(
            &StormCode::new(code),
            &requester,
            &IdeaId::new(id),
            req.title.as_deref(),
            req.description.as_deref(),
        )
        .await?;
    Ok(Json(idea))
}

async fn delete_idea(
    State(service): State<AppState>,
    Path((code, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode> {
    let requester = session(&headers)?;
    service
        .delete_idea(&StormCode::new(code), &requester, &IdeaId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// Token counts are signed so negative input surfaces as a validation error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoteRequest {
    #[serde(default)]
    blue_tokens: i64,
    #[serde(default)]
    red_tokens: i64,
    #[serde(default)]
    comment: String,
}

async fn submit_vote(
    State(service): State<AppState>,
    Path((code, id)): Path<(String, String)>,
    headers: HeaderMap,
    body: JsonBody<VoteRequest>,
) -> Result<Json<Vote>> {
    let requester = session(&headers)?;
    let req = payload(body)?;
    let vote = service
        .submit_vote(
            &StormCode::new(code),
            &requester,
            &IdeaId::new(id),
            req.blue_tokens,
            req.red_tokens,
            &req.comment,
        )
        .await?;
    Ok(Json(vote))
}

// --- Session endpoints ---

async fn get_session(
    State(service): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionView>> {
    let requester = session(&headers)?;
    Ok(Json(service.get_session(&requester).await?))
}

async fn leave(State(service): State<AppState>, headers: HeaderMap) -> Result<StatusCode> {
    let requester = session(&headers)?;
    service.leave(&requester).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Errors ---

impl Error {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Storm(e) => match e {
                StormError::Validation(_) => StatusCode::BAD_REQUEST,
                StormError::Unauthenticated => StatusCode::UNAUTHORIZED,
                StormError::Forbidden(_) | StormError::NotAMember => StatusCode::FORBIDDEN,
                StormError::NotFound(_) => StatusCode::NOT_FOUND,
                StormError::PhaseViolation { .. } | StormError::InvalidTransition(_) => {
                    StatusCode::CONFLICT
                }
                StormError::BudgetExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                StormError::Integrity(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Config(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "request failed");
        }

        let body = match &self {
            Error::Storm(StormError::BudgetExceeded {
                color,
                requested,
                remaining,
            }) => json!({
                "error": self.to_string(),
                "kind": self.kind(),
                "color": color,
                "requested": requested,
                "remaining": remaining,
            }),
            _ => json!({
                "error": self.to_string(),
                "kind": self.kind(),
            }),
        };
        (status, Json(body)).into_response()
    }
}
