//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers, the dashboard and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::ingredient_service::IngredientService`] - Ingredients and allergen profiles
//! - [`services::allergen_service::AllergenService`] - Allergen catalog
//! - [`services::formula_service::FormulaService`] - Formulas and their compositions
//! - [`services::composition_service::CompositionService`] - Allergen exposure of formulas
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
