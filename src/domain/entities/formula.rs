//! Domain entity representing a perfume formula.

use chrono::{DateTime, Utc};

/// A named mixture of ingredients, each weighted by relative parts.
///
/// The composition itself is stored as
/// [`FormulaIngredient`](super::links::FormulaIngredient) rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    pub id: i64,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Formula {
    /// Creates a new Formula instance.
    pub fn new(
        id: i64,
        name: String,
        owner_id: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            owner_id,
            created_at,
            updated_at,
        }
    }
}

/// Input data for creating a formula.
#[derive(Debug, Clone)]
pub struct NewFormula {
    pub name: String,
}
