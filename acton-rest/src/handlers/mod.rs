//! Request handlers for registered resources
//!
//! This module holds the per-operation axum handlers and the pieces they
//! share: the authorization checkpoint, the error type, and the [`Page`]
//! container returned by paged listings.
//!
//! # Checkpoint order
//!
//! | Operation | Steps |
//! |---|---|
//! | list, page | (token) → authorize(no items) → fetch → DTO |
//! | search, create | body → authorize(no items) → call → DTO |
//! | get, sub-entity | lookup → authorize(item or none) → DTO / raw |
//! | update | body → lookup → authorize(item or none) → mutate → DTO |
//! | delete | lookup → authorize(item or none) → delete → `deleted` |
//!
//! A lookup miss is reported as 404 only when the predicate permits the
//! action with no items; otherwise the caller sees 401.
//!
//! Handlers are not exported; they are wired up by
//! [`Resource::into_router`](crate::resource::Resource::into_router).

mod checkpoint;
mod error;
pub(crate) mod operations;
mod page;

pub use error::{ApiError, ApiErrorKind, ApiOperation};
pub use operations::DELETED;
pub use page::Page;
