//! Domain layer of the course enrollment API.
//!
//! Operations in [`users`] and [`courses`] return a [`DomainResult`]: either a
//! value, a [`DomainError::Validation`] carrying per-field messages, or a
//! [`DomainError::Unexpected`] wrapping a storage fault. Successful values are
//! converted into [`Entity`] and rendered with [`serializer::to_primitive`].

pub mod courses;
pub mod outcome;
pub mod serializer;
pub mod store;
pub mod types;
pub mod users;

#[cfg(test)]
mod test_support;

pub use courses::CourseDomain;
pub use outcome::{DomainError, DomainResult, FieldErrors, BASE};
pub use store::{EntityStore, StoreError, StoreResult};
pub use types::{Course, Enrollment, Entity, User};
pub use users::UserDomain;
