use crate::outcome::{DomainError, DomainResult, BASE, CANT_BE_BLANK};
use crate::store::{EntityStore, StoreError};
use crate::types::{Course, Enrollment};
use crate::users::USER_MISSING;

pub const COURSE_MISSING: &str = "course does not exist";
pub const MUST_EXIST: &str = "must exist";
pub const ALREADY_ENROLLED: &str = "user already enrolled";
pub const NOT_ENROLLED: &str = "user is not enrolled";

/// Course catalogue and enrollment operations.
#[derive(Debug, Clone)]
pub struct CourseDomain<S> {
    store: S,
}

impl<S: EntityStore> CourseDomain<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persists a new course. Names are required but may repeat.
    pub async fn create_course(&self, name: &str) -> DomainResult<Course> {
        if name.trim().is_empty() {
            return Err(DomainError::invalid("name", CANT_BE_BLANK));
        }

        Ok(self.store.insert_course(name).await?)
    }

    /// Deletes a course together with its enrollments and returns the deleted record.
    pub async fn delete_course(&self, id: i64) -> DomainResult<Course> {
        let Some(course) = self.store.find_course(id).await? else {
            return Err(DomainError::invalid(BASE, COURSE_MISSING));
        };

        if !self.store.delete_course(id).await? {
            return Err(DomainError::invalid(BASE, COURSE_MISSING));
        }
        Ok(course)
    }

    /// Lists all courses with the number of users enrolled in each.
    pub async fn list_courses(&self) -> DomainResult<Vec<Course>> {
        Ok(self.store.list_courses_with_counts().await?)
    }

    /// Lists the courses a user is enrolled in.
    pub async fn list_courses_for_user(&self, user_id: i64) -> DomainResult<Vec<Course>> {
        if self.store.find_user(user_id).await?.is_none() {
            return Err(DomainError::invalid(BASE, USER_MISSING));
        }

        Ok(self.store.list_courses_for_user(user_id).await?)
    }

    /// Enrolls a user into a course. A pair can be enrolled at most once.
    pub async fn enroll_user(&self, course_id: i64, user_id: i64) -> DomainResult<Enrollment> {
        if self.store.find_course(course_id).await?.is_none() {
            return Err(DomainError::invalid("course", MUST_EXIST));
        }

        if self.store.find_user(user_id).await?.is_none() {
            return Err(DomainError::invalid("user", MUST_EXIST));
        }

        if self
            .store
            .find_enrollment(course_id, user_id)
            .await?
            .is_some()
        {
            return Err(DomainError::invalid(BASE, ALREADY_ENROLLED));
        }

        match self.store.insert_enrollment(course_id, user_id).await {
            Ok(enrollment) => Ok(enrollment),
            Err(StoreError::UniqueViolation) => Err(DomainError::invalid(BASE, ALREADY_ENROLLED)),
            // user or course removed between the checks and the insert
            Err(StoreError::ForeignKeyViolation) => {
                if self.store.find_course(course_id).await?.is_none() {
                    Err(DomainError::invalid("course", MUST_EXIST))
                } else {
                    Err(DomainError::invalid("user", MUST_EXIST))
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Removes a user from a course and returns the deleted enrollment.
    pub async fn withdraw_user(&self, course_id: i64, user_id: i64) -> DomainResult<Enrollment> {
        if self.store.find_course(course_id).await?.is_none() {
            return Err(DomainError::invalid("course", MUST_EXIST));
        }

        let Some(enrollment) = self.store.find_enrollment(course_id, user_id).await? else {
            return Err(DomainError::invalid(BASE, NOT_ENROLLED));
        };

        self.store.delete_enrollment(enrollment.id).await?;
        Ok(enrollment)
    }
}
