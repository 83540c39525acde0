//! Request handlers.
//!
//! The service does blocking point reads, so every call into it runs on the
//! blocking pool.

use crate::{AppState, CONVERSATION_HEADER};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use waterwatch_core::ConversationId;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub date: Option<String>,
}

/// Errors surfaced to HTTP clients. Messages never carry backend detail.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unavailable,
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service temporarily unavailable".to_string(),
            ),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub async fn healthz_handler() -> &'static str {
    "ok"
}

fn conversation_id(headers: &HeaderMap) -> ConversationId {
    headers
        .get(CONVERSATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ConversationId::from)
        .unwrap_or_else(ConversationId::new_random)
}

/// `POST /api/query`: one dialog turn. The conversation id is echoed back.
pub async fn query_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<QueryRequest>,
) -> Result<Response, ApiError> {
    let id = conversation_id(&headers);
    let today = state.today();
    let service = state.service.clone();
    let turn_id = id.clone();

    let reply = tokio::task::spawn_blocking(move || {
        service.handle_message_on(&turn_id, &request.message, today)
    })
    .await
    .map_err(|e| {
        error!(conversation = %id, error = %e, "query task failed");
        ApiError::Internal
    })?;

    Ok((
        StatusCode::OK,
        [(CONVERSATION_HEADER, id.to_string())],
        Json(QueryResponse {
            response: reply.response,
        }),
    )
        .into_response())
}

/// `GET /api/provinces/:province/districts/:name/status?date=YYYY-MM-DD`
pub async fn district_status_handler(
    State(state): State<AppState>,
    Path((province, name)): Path<(String, String)>,
    Query(params): Query<StatusParams>,
) -> Result<Response, ApiError> {
    let date = match params.date.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ApiError::BadRequest(format!("invalid date '{raw}', expected YYYY-MM-DD")))?,
        None => state.today(),
    };

    let service = state.service.clone();
    let (p, d) = (province.clone(), name.clone());
    let report = tokio::task::spawn_blocking(move || service.district_status(&p, &d, date))
        .await
        .map_err(|e| {
            error!(%province, district = %name, error = %e, "status task failed");
            ApiError::Internal
        })?
        .map_err(|e| {
            error!(%province, district = %name, error = %e, "district status lookup failed");
            ApiError::Unavailable
        })?;

    match report {
        Some(report) => Ok(Json(report).into_response()),
        None => Err(ApiError::NotFound(format!(
            "no data for {name} ({province}) on {date}"
        ))),
    }
}
