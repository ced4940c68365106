use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use course_api_core::{
    serializer::to_primitive, DomainError, DomainResult, Entity, FieldErrors, StoreError,
};
use metrics::counter;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Receives the cause of every unexpected domain failure.
///
/// Causes never reach the response body, so this is the only place they are recorded.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, operation: &'static str, cause: &StoreError);
}

/// Logs the cause and counts it under `domain_unexpected_errors_total`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, operation: &'static str, cause: &StoreError) {
        counter!("domain_unexpected_errors_total", "operation" => operation).increment(1);
        error!(stage = "domain", operation, error = %cause, "unexpected domain failure");
    }
}

/// JSON body of a mapped domain result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Entity(Value),
    Errors(FieldErrors),
    Message { message: &'static str },
}

/// Domain result mapped onto an HTTP status and JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainResponse {
    status: StatusCode,
    body: ResponseBody,
}

impl DomainResponse {
    /// Maps a result using `200 OK` for success.
    pub fn from_result<T: Into<Entity>>(
        operation: &'static str,
        result: DomainResult<T>,
        reporter: &dyn ErrorReporter,
    ) -> Self {
        Self::with_status(operation, result, StatusCode::OK, reporter)
    }

    /// Maps a result: success uses `success`, validation failures `422`,
    /// unexpected errors `500` with a fixed message.
    pub fn with_status<T: Into<Entity>>(
        operation: &'static str,
        result: DomainResult<T>,
        success: StatusCode,
        reporter: &dyn ErrorReporter,
    ) -> Self {
        let outcome = match &result {
            Ok(_) => "ok",
            Err(err) => err.kind_str(),
        };
        counter!("domain_results_total", "operation" => operation, "outcome" => outcome)
            .increment(1);

        match result {
            Ok(value) => Self {
                status: success,
                body: ResponseBody::Entity(to_primitive(&value.into())),
            },
            Err(DomainError::Validation(errors)) => {
                debug!(stage = "domain", operation, errors = %errors, "validation failed");
                Self {
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    body: ResponseBody::Errors(errors),
                }
            }
            Err(DomainError::Unexpected(cause)) => {
                reporter.report(operation, &cause);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: ResponseBody::Message {
                        message: INTERNAL_ERROR_MESSAGE,
                    },
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }
}

impl IntoResponse for DomainResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
