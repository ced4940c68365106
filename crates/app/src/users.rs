use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::params;
use crate::problem::ProblemResponse;
use crate::response::DomainResponse;
use crate::router::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    email: Option<String>,
}

/// `POST /users`
pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<DomainResponse, ProblemResponse> {
    let request: CreateUserRequest = params::from_body(&body)?;
    let email = request.email.unwrap_or_default();
    let result = state.users().create_user(&email).await;
    Ok(state.respond_with("users.create", result, StatusCode::CREATED))
}

/// `DELETE /users/:id`
pub async fn destroy(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<DomainResponse, ProblemResponse> {
    let Path(id) = path?;
    let result = state.users().delete_user(id).await;
    Ok(state.respond("users.delete", result))
}

/// `GET /users/:id/courses`
pub async fn courses(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<DomainResponse, ProblemResponse> {
    let Path(id) = path?;
    let result = state.courses().list_courses_for_user(id).await;
    Ok(state.respond("users.courses", result))
}
