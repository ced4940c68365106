//! In-memory [`EntityStore`] used by the domain tests.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::store::{EntityStore, StoreError, StoreResult};
use crate::types::{Course, Enrollment, User};

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    users: Vec<User>,
    courses: Vec<Course>,
    enrollments: Vec<Enrollment>,
    failing: bool,
    stale_reads: bool,
    pending_removals: Vec<Removal>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn apply_pending_removals(&mut self) {
        for removal in std::mem::take(&mut self.pending_removals) {
            match removal {
                Removal::User(id) => {
                    self.users.retain(|user| user.id != id);
                    self.enrollments.retain(|enrollment| enrollment.user_id != id);
                }
                Removal::Course(id) => {
                    self.courses.retain(|course| course.id != id);
                    self.enrollments.retain(|enrollment| enrollment.course_id != id);
                }
            }
        }
    }
}

/// A record deleted by some other request.
#[derive(Debug, Clone, Copy)]
pub enum Removal {
    User(i64),
    Course(i64),
}

/// Enforces the same constraints as the SQLite schema.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Makes every call fail with a backend error.
    pub fn set_failing(&self, failing: bool) {
        self.lock_raw().failing = failing;
    }

    /// Makes duplicate lookups miss, so only the constraints catch duplicates.
    pub fn set_stale_reads(&self, stale: bool) {
        self.lock_raw().stale_reads = stale;
    }

    /// Deletes the record right before the next write, after any lookups have passed.
    pub fn remove_before_next_write(&self, removal: Removal) {
        self.lock_raw().pending_removals.push(removal);
    }

    pub fn users(&self) -> Vec<User> {
        self.lock_raw().users.clone()
    }

    pub fn courses(&self) -> Vec<Course> {
        self.lock_raw().courses.clone()
    }

    pub fn enrollments(&self) -> Vec<Enrollment> {
        self.lock_raw().enrollments.clone()
    }

    fn lock_raw(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory store poisoned")
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        let state = self.lock_raw();
        if state.failing {
            return Err(StoreError::backend("memory store offline"));
        }
        Ok(state)
    }

    fn lock_for_write(&self) -> StoreResult<MutexGuard<'_, MemoryState>> {
        let mut state = self.lock()?;
        state.apply_pending_removals();
        Ok(state)
    }
}

impl EntityStore for MemoryStore {
    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        let state = self.lock()?;
        Ok(state.users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.lock()?;
        if state.stale_reads {
            return Ok(None);
        }
        Ok(state.users.iter().find(|user| user.email == email).cloned())
    }

    async fn insert_user(&self, email: &str) -> StoreResult<User> {
        let mut state = self.lock_for_write()?;
        if state.users.iter().any(|user| user.email == email) {
            return Err(StoreError::UniqueViolation);
        }
        let user = User {
            id: state.next_id(),
            email: email.to_string(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        let mut state = self.lock_for_write()?;
        let before = state.users.len();
        state.users.retain(|user| user.id != id);
        state.enrollments.retain(|enrollment| enrollment.user_id != id);
        Ok(state.users.len() != before)
    }

    async fn find_course(&self, id: i64) -> StoreResult<Option<Course>> {
        let state = self.lock()?;
        Ok(state.courses.iter().find(|course| course.id == id).cloned())
    }

    async fn insert_course(&self, name: &str) -> StoreResult<Course> {
        let mut state = self.lock_for_write()?;
        let course = Course {
            id: state.next_id(),
            name: name.to_string(),
            enrollments_count: None,
        };
        state.courses.push(course.clone());
        Ok(course)
    }

    async fn delete_course(&self, id: i64) -> StoreResult<bool> {
        let mut state = self.lock_for_write()?;
        let before = state.courses.len();
        state.courses.retain(|course| course.id != id);
        state.enrollments.retain(|enrollment| enrollment.course_id != id);
        Ok(state.courses.len() != before)
    }

    async fn list_courses_with_counts(&self) -> StoreResult<Vec<Course>> {
        let state = self.lock()?;
        Ok(state
            .courses
            .iter()
            .map(|course| {
                let count = state
                    .enrollments
                    .iter()
                    .filter(|enrollment| enrollment.course_id == course.id)
                    .count();
                course.clone().with_enrollments_count(count as i64)
            })
            .collect())
    }

    async fn list_courses_for_user(&self, user_id: i64) -> StoreResult<Vec<Course>> {
        let state = self.lock()?;
        Ok(state
            .courses
            .iter()
            .filter(|course| {
                state
                    .enrollments
                    .iter()
                    .any(|e| e.course_id == course.id && e.user_id == user_id)
            })
            .cloned()
            .collect())
    }

    async fn find_enrollment(
        &self,
        course_id: i64,
        user_id: i64,
    ) -> StoreResult<Option<Enrollment>> {
        let state = self.lock()?;
        if state.stale_reads {
            return Ok(None);
        }
        Ok(state
            .enrollments
            .iter()
            .find(|e| e.course_id == course_id && e.user_id == user_id)
            .cloned())
    }

    async fn insert_enrollment(&self, course_id: i64, user_id: i64) -> StoreResult<Enrollment> {
        let mut state = self.lock_for_write()?;
        let user_exists = state.users.iter().any(|user| user.id == user_id);
        let course_exists = state.courses.iter().any(|course| course.id == course_id);
        if !user_exists || !course_exists {
            return Err(StoreError::ForeignKeyViolation);
        }
        if state
            .enrollments
            .iter()
            .any(|e| e.course_id == course_id && e.user_id == user_id)
        {
            return Err(StoreError::UniqueViolation);
        }
        let enrollment = Enrollment {
            id: state.next_id(),
            user_id,
            course_id,
        };
        state.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn delete_enrollment(&self, id: i64) -> StoreResult<bool> {
        let mut state = self.lock_for_write()?;
        let before = state.enrollments.len();
        state.enrollments.retain(|enrollment| enrollment.id != id);
        Ok(state.enrollments.len() != before)
    }
}
