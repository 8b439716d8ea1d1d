//! Domain layer containing business entities and logic.
//!
//! This module holds the formulary's data model and the pure calculations
//! performed on it. Nothing in here touches the database or the network.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`composition`] - Allergen exposure of a formula
//! - [`percent`] - Fraction/percentage formatting
//! - [`search`] - Substring search over records
//! - [`summary`] - Per-ingredient allergen overview
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Orchestration lives in services (see [`crate::application::services`])
//!
//! # Exposure Flow
//!
//! 1. A handler asks [`crate::application::services::CompositionService`] for a formula
//! 2. The service loads the composition rows and each ingredient's allergen profile
//! 3. [`composition::aggregate_allergens`] turns them into per-allergen totals
//! 4. Totals are rendered with [`percent::format_percent_display`]

pub mod composition;
pub mod entities;
pub mod percent;
pub mod repositories;
pub mod search;
pub mod summary;
