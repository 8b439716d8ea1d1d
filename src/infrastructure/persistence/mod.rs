//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx. Queries
//! are bound at runtime and mapped through private `FromRow` structs, so the
//! crate builds without a live database.
//!
//! # Repositories
//!
//! - [`PgIngredientRepository`] - Ingredients and their allergen links
//! - [`PgAllergenRepository`] - Allergen storage and retrieval
//! - [`PgFormulaRepository`] - Formulas and their compositions
//! - [`PgTokenRepository`] - API token storage and validation

pub mod pg_allergen_repository;
pub mod pg_formula_repository;
pub mod pg_ingredient_repository;
pub mod pg_token_repository;

pub use pg_allergen_repository::PgAllergenRepository;
pub use pg_formula_repository::PgFormulaRepository;
pub use pg_ingredient_repository::PgIngredientRepository;
pub use pg_token_repository::PgTokenRepository;
