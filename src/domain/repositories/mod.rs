//! Repository trait definitions for the domain layer.
//!
//! This module defines the repository interfaces (traits) that abstract data access
//! operations following the Repository pattern. These traits are implemented by
//! concrete repositories in the infrastructure layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Every tenant-owned record is read and written through an [`OwnerId`](crate::domain::entities::OwnerId)
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`IngredientRepository`] - Ingredients and their allergen links
//! - [`AllergenRepository`] - Allergen CRUD
//! - [`FormulaRepository`] - Formulas and their compositions
//! - [`TokenRepository`] - API token authentication
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod allergen_repository;
pub mod formula_repository;
pub mod ingredient_repository;
pub mod token_repository;

pub use allergen_repository::AllergenRepository;
pub use formula_repository::FormulaRepository;
pub use ingredient_repository::IngredientRepository;
pub use token_repository::{ApiToken, TokenRepository};

#[cfg(test)]
pub use allergen_repository::MockAllergenRepository;
#[cfg(test)]
pub use formula_repository::MockFormulaRepository;
#[cfg(test)]
pub use ingredient_repository::MockIngredientRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
