use axum::{body::Bytes, http::StatusCode};
use serde::de::DeserializeOwned;

use crate::problem::ProblemResponse;

/// Decodes a JSON request body into `T`.
///
/// A request without a body carries no parameters, so an empty or
/// whitespace-only body yields `T::default()` and every field reads as absent.
/// The content type is not consulted.
pub fn from_body<T>(body: &Bytes) -> Result<T, ProblemResponse>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|err| {
        ProblemResponse::new(
            StatusCode::BAD_REQUEST,
            "invalid_json",
            format!("failed to parse payload: {err}"),
        )
    })
}
