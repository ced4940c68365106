use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use course_api_core::{CourseDomain, DomainResult, Entity, UserDomain};
use course_api_storage::Database;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::response::{DomainResponse, ErrorReporter, TracingReporter};
use crate::{courses, enrollments, telemetry, users};

#[derive(Clone)]
pub struct AppState {
    metrics: PrometheusHandle,
    users: UserDomain<Database>,
    courses: CourseDomain<Database>,
    reporter: Arc<dyn ErrorReporter>,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, storage: Database) -> Self {
        Self {
            metrics,
            users: UserDomain::new(storage.clone()),
            courses: CourseDomain::new(storage),
            reporter: Arc::new(TracingReporter),
        }
    }

    #[cfg(test)]
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn metrics(&self) -> &PrometheusHandle {
        &self.metrics
    }

    pub fn users(&self) -> &UserDomain<Database> {
        &self.users
    }

    pub fn courses(&self) -> &CourseDomain<Database> {
        &self.courses
    }

    /// Maps a domain result with `200 OK` as the success status.
    pub fn respond<T: Into<Entity>>(
        &self,
        operation: &'static str,
        result: DomainResult<T>,
    ) -> DomainResponse {
        DomainResponse::from_result(operation, result, self.reporter.as_ref())
    }

    pub fn respond_with<T: Into<Entity>>(
        &self,
        operation: &'static str,
        result: DomainResult<T>,
        success: StatusCode,
    ) -> DomainResponse {
        DomainResponse::with_status(operation, result, success, self.reporter.as_ref())
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/users", post(users::create))
        .route("/users/:id", delete(users::destroy))
        .route("/users/:id/courses", get(users::courses))
        .route("/courses", post(courses::create).get(courses::index))
        .route("/courses/:id", delete(courses::destroy))
        .route("/courses/:id/enrollments", post(enrollments::create))
        .route("/courses/:id/enrollments/:user_id", delete(enrollments::destroy))
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = telemetry::render_metrics(state.metrics());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}
