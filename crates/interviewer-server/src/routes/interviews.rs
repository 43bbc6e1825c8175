//! Interview link endpoints.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ServerError;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for issuing a link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInterviewRequest {
    /// Questions, in the order they will be asked.
    pub questions: Vec<String>,
}

/// Response for a newly issued link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInterviewResponse {
    /// Key the candidate uses to open the interview.
    pub unique_link: String,
}

/// What a candidate sees for a link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewResponse {
    pub questions: Vec<String>,
}

/// Uploads recorded against a link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsResponse {
    pub uploads: Vec<Value>,
}

const INVALID_INPUT: &str = "Invalid input. 'questions' array is required.";
const NOT_FOUND: &str = "Interview not found";

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/interviews - Issue a new interview link.
pub async fn create_interview_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateInterviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateInterviewResponse>), ServerError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Rejected interview payload");
        ServerError::BadRequest(INVALID_INPUT.to_string())
    })?;

    let key = state.create_interview(request.questions);

    Ok((
        StatusCode::CREATED,
        Json(CreateInterviewResponse {
            unique_link: key.into(),
        }),
    ))
}

/// GET /api/interviews/{id} - Questions for a link.
pub async fn get_interview_handler(
    State(state): State<AppState>,
    Path(link_id): Path<String>,
) -> Result<Json<InterviewResponse>, ServerError> {
    let record = state
        .fetch_interview(&link_id)
        .ok_or_else(|| ServerError::NotFound(NOT_FOUND.to_string()))?;

    Ok(Json(InterviewResponse {
        questions: record.questions,
    }))
}

/// DELETE /api/interviews/{id} - Retire a link and forget its uploads.
pub async fn delete_interview_handler(
    State(state): State<AppState>,
    Path(link_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    if state.close_interview(&link_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::NotFound(NOT_FOUND.to_string()))
    }
}

/// GET /api/interviews/{id}/uploads - Uploads recorded for a link.
pub async fn list_uploads_handler(
    State(state): State<AppState>,
    Path(link_id): Path<String>,
) -> Result<Json<UploadsResponse>, ServerError> {
    if !state.interview_exists(&link_id) {
        return Err(ServerError::NotFound(NOT_FOUND.to_string()));
    }

    Ok(Json(UploadsResponse {
        uploads: state.uploads_for(&link_id),
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
