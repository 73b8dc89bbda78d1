//! `shopwise-core`: shared domain primitives (ids, errors, entity marker).
//!
//! No IO, no HTTP, no storage.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ProductId, UserId};
