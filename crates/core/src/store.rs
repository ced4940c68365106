use std::{error::Error as StdError, future::Future};

use thiserror::Error;

use crate::types::{Course, Enrollment, User};

pub type StoreResult<T> = Result<T, StoreError>;

/// Faults reported by an [`EntityStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    UniqueViolation,
    #[error("foreign key constraint violated")]
    ForeignKeyViolation,
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn StdError + Send + Sync>),
}

impl StoreError {
    pub fn backend(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }
}

/// Persistence port consumed by the domain operations.
///
/// Implementations must enforce `UNIQUE(users.email)` and
/// `UNIQUE(enrollments.user_id, enrollments.course_id)`, and cascade user and
/// course deletion to their enrollments.
pub trait EntityStore: Send + Sync {
    fn find_user(&self, id: i64) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    fn insert_user(&self, email: &str) -> impl Future<Output = StoreResult<User>> + Send;

    /// Deletes the user and its enrollments. Returns `false` when nothing was deleted.
    fn delete_user(&self, id: i64) -> impl Future<Output = StoreResult<bool>> + Send;

    fn find_course(&self, id: i64) -> impl Future<Output = StoreResult<Option<Course>>> + Send;

    fn insert_course(&self, name: &str) -> impl Future<Output = StoreResult<Course>> + Send;

    /// Deletes the course and its enrollments. Returns `false` when nothing was deleted.
    fn delete_course(&self, id: i64) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Lists every course ordered by id with `enrollments_count` attached.
    fn list_courses_with_counts(&self) -> impl Future<Output = StoreResult<Vec<Course>>> + Send;

    /// Lists the courses the user is enrolled in, ordered by id.
    fn list_courses_for_user(
        &self,
        user_id: i64,
    ) -> impl Future<Output = StoreResult<Vec<Course>>> + Send;

    fn find_enrollment(
        &self,
        course_id: i64,
        user_id: i64,
    ) -> impl Future<Output = StoreResult<Option<Enrollment>>> + Send;

    fn insert_enrollment(
        &self,
        course_id: i64,
        user_id: i64,
    ) -> impl Future<Output = StoreResult<Enrollment>> + Send;

    fn delete_enrollment(&self, id: i64) -> impl Future<Output = StoreResult<bool>> + Send;
}
