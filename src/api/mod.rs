//! API layer
//!
//! HTTP handlers for:
//! - Post endpoints
//! - Metrics (Prometheus)

mod dto;
pub mod metrics;
mod posts;

pub use dto::*;

pub use metrics::metrics_router;
pub use posts::posts_router;
