//! Browser dashboard under `/dashboard`.
//!
//! Server-rendered Askama pages listing formulas and showing the allergen
//! exposure of each one. Authenticates with the same API tokens, kept in a
//! cookie.

pub mod handlers;
pub mod middleware;
pub mod routes;
