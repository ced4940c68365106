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
pub struct CreateCourseRequest {
    #[serde(default)]
    name: Option<String>,
}

/// `POST /courses`
pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<DomainResponse, ProblemResponse> {
    let request: CreateCourseRequest = params::from_body(&body)?;
    let name = request.name.unwrap_or_default();
    let result = state.courses().create_course(&name).await;
    Ok(state.respond_with("courses.create", result, StatusCode::CREATED))
}

/// `DELETE /courses/:id`
pub async fn destroy(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<DomainResponse, ProblemResponse> {
    let Path(id) = path?;
    let result = state.courses().delete_course(id).await;
    Ok(state.respond("courses.delete", result))
}

/// `GET /courses`
pub async fn index(State(state): State<AppState>) -> DomainResponse {
    let result = state.courses().list_courses().await;
    state.respond("courses.index", result)
}
