//! PostgreSQL repositories and the allergen profile cache.
//!
//! - [`cache`] - Redis-backed profile cache and its no-op stand-in
//! - [`persistence`] - implementations of the domain repository traits

pub mod cache;
pub mod persistence;
