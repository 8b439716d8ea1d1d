//! Core domain entities of the formulary.
//!
//! Entities are plain data structures. Records owned by a tenant carry the
//! owner id; every repository call is scoped by an [`OwnerId`].
//!
//! # Entity Types
//!
//! - [`Ingredient`] - A raw material usable in formulas
//! - [`Allergen`] - A regulated substance tracked for disclosure
//! - [`Formula`] - A named mixture of ingredients weighted by parts
//!
//! # Design Pattern
//!
//! Creation and update inputs are separate structs:
//! - `NewIngredient`, `NewAllergen`, `NewFormula` - For creating new records
//! - `AllergenPatch` - For partial updates
//!
//! Link rows between entities live in [`links`].

pub mod allergen;
pub mod formula;
pub mod ingredient;
pub mod links;
pub mod owner;

pub use allergen::{Allergen, AllergenPatch, NewAllergen};
pub use formula::{Formula, NewFormula};
pub use ingredient::{Ingredient, NewIngredient};
pub use links::{AllergenLinkInput, FormulaIngredient, IngredientAllergenRow};
pub use owner::OwnerId;
