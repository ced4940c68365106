use std::{collections::BTreeMap, fmt};

use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Key used for errors that do not belong to a single input field.
pub const BASE: &str = "base";

/// Message for a required value that is empty or whitespace only.
pub const CANT_BE_BLANK: &str = "can't be blank";

/// Outcome of every domain operation.
pub type DomainResult<T> = Result<T, DomainError>;

/// Failure arms of a domain operation. The set is closed: callers match it exhaustively.
#[derive(Debug, Error)]
pub enum DomainError {
    /// User-recoverable input problem, returned to the caller verbatim.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    /// Fault raised below the domain. Never shown to the caller.
    #[error("unexpected error: {0}")]
    Unexpected(#[from] StoreError),
}

impl DomainError {
    /// Builds a validation failure carrying a single message.
    pub fn invalid(field: &str, message: &str) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }

    /// Returns the outcome label used in logs and metrics.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::Unexpected(_) => "unexpected_error",
        }
    }
}

/// Messages grouped by the field they refer to.
///
/// Serializes as `{"field": ["message", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Appends a message to the field, keeping insertion order per field.
    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str(", ")?;
                }
                write!(f, "{field} {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}
