//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate database and upstream operations.

mod post;

pub use post::PostService;
