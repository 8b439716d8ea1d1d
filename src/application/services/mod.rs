//! Business logic services for the application layer.

pub mod allergen_service;
pub mod auth_service;
pub mod composition_service;
pub mod formula_service;
pub mod ingredient_service;

pub use allergen_service::AllergenService;
pub use auth_service::{AuthService, hash_token};
pub use composition_service::{
    ComposedIngredient, CompositionService, ExposureReport, FormulaExposure, ProfileFetchSettings,
};
pub use formula_service::FormulaService;
pub use ingredient_service::IngredientService;
