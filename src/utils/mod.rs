//! Helper functions shared across layers.
//!
//! - [`validation`] - Name, quantity, id and CAS number checks

pub mod validation;
