use crate::outcome::{DomainError, DomainResult, BASE, CANT_BE_BLANK};
use crate::store::{EntityStore, StoreError};
use crate::types::User;

pub const EMAIL_TAKEN: &str = "has already been taken";
pub const USER_MISSING: &str = "user does not exist";

/// User lifecycle operations.
#[derive(Debug, Clone)]
pub struct UserDomain<S> {
    store: S,
}

impl<S: EntityStore> UserDomain<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persists a new user. The email must be present and unused.
    pub async fn create_user(&self, email: &str) -> DomainResult<User> {
        if email.trim().is_empty() {
            return Err(DomainError::invalid("email", CANT_BE_BLANK));
        }

        if self.store.find_user_by_email(email).await?.is_some() {
            return Err(DomainError::invalid("email", EMAIL_TAKEN));
        }

        // the lookup above races with concurrent inserts; the store constraint decides
        match self.store.insert_user(email).await {
            Ok(user) => Ok(user),
            Err(StoreError::UniqueViolation) => Err(DomainError::invalid("email", EMAIL_TAKEN)),
            Err(err) => Err(err.into()),
        }
    }

    /// Deletes a user together with its enrollments and returns the deleted record.
    pub async fn delete_user(&self, id: i64) -> DomainResult<User> {
        let Some(user) = self.store.find_user(id).await? else {
            return Err(DomainError::invalid(BASE, USER_MISSING));
        };

        // a concurrent delete may have won since the lookup
        if !self.store.delete_user(id).await? {
            return Err(DomainError::invalid(BASE, USER_MISSING));
        }
        Ok(user)
    }
}
