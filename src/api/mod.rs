//! JSON API under `/api`.
//!
//! Every route here is scoped to the owner resolved from the Bearer token.
//!
//! - [`dto`] - request bodies and response shapes (camelCase JSON)
//! - [`handlers`] - one handler per endpoint
//! - [`middleware`] - token auth, rate limiting and request tracing
//! - [`routes`] - the protected route table

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
