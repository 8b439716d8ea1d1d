//! Layers applied to the API and dashboard routers.

pub mod auth;
pub mod rate_limit;
pub mod tracing;
