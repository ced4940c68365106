use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
};
use course_api_core::{courses::MUST_EXIST, DomainError};
use serde::Deserialize;

use crate::params;
use crate::problem::ProblemResponse;
use crate::response::DomainResponse;
use crate::router::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EnrollRequest {
    #[serde(default)]
    user_id: Option<i64>,
}

/// `POST /courses/:id/enrollments`
pub async fn create(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Result<DomainResponse, ProblemResponse> {
    let Path(course_id) = path?;
    let request: EnrollRequest = params::from_body(&body)?;
    let result = match request.user_id {
        Some(user_id) => state.courses().enroll_user(course_id, user_id).await,
        // an absent user id names no user at all
        None => Err(DomainError::invalid("user", MUST_EXIST)),
    };
    Ok(state.respond_with("enrollments.create", result, StatusCode::CREATED))
}

/// `DELETE /courses/:id/enrollments/:user_id`
pub async fn destroy(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<DomainResponse, ProblemResponse> {
    let Path((course_id, user_id)) = path?;
    let result = state.courses().withdraw_user(course_id, user_id).await;
    Ok(state.respond("enrollments.delete", result))
}
