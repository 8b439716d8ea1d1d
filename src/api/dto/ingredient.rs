//! DTOs for ingredient endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::composition::AllergenShare;
use crate::domain::entities::{AllergenLinkInput, Ingredient};
use crate::domain::percent::{DISPLAY_DECIMALS, format_percent_display};
use crate::domain::summary::{IngredientSummary, TopAllergen};

/// Request body for `POST /api/ingredients`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateIngredientRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    /// Initial allergen profile.
    #[serde(default)]
    #[validate(nested)]
    pub allergens: Vec<AllergenLinkRequest>,
}

/// Request body for `PATCH /api/ingredients/{id}`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIngredientRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

/// One allergen of an ingredient, as sent by clients.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AllergenLinkRequest {
    #[validate(range(min = 1))]
    pub allergen_id: i64,

    /// Fraction of the ingredient's mass (0.25 = 25%).
    #[validate(range(min = 0.0))]
    pub concentration: f64,
}

impl From<AllergenLinkRequest> for AllergenLinkInput {
    fn from(r: AllergenLinkRequest) -> Self {
        AllergenLinkInput {
            allergen_id: r.allergen_id,
            concentration: r.concentration,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientItem {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Ingredient> for IngredientItem {
    fn from(i: Ingredient) -> Self {
        IngredientItem {
            id: i.id,
            name: i.name,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

/// Entry of the ingredient list: name plus allergen overview.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientSummaryItem {
    pub id: i64,
    pub name: String,
    pub allergen_count: usize,
    pub top_allergens: Vec<TopAllergenItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopAllergenItem {
    pub id: i64,
    pub name: String,
    pub concentration: f64,
    pub percent: String,
}

impl From<TopAllergen> for TopAllergenItem {
    fn from(t: TopAllergen) -> Self {
        TopAllergenItem {
            percent: format_percent_display(t.concentration, DISPLAY_DECIMALS),
            id: t.id,
            name: t.name,
            concentration: t.concentration,
        }
    }
}

impl From<IngredientSummary> for IngredientSummaryItem {
    fn from(s: IngredientSummary) -> Self {
        IngredientSummaryItem {
            id: s.id,
            name: s.name,
            allergen_count: s.allergen_count,
            top_allergens: s.top_allergens.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IngredientListResponse {
    pub items: Vec<IngredientSummaryItem>,
}

/// An allergen within one ingredient.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientAllergenItem {
    pub allergen_id: i64,
    pub allergen_name: String,
    pub concentration: f64,
    pub percent: String,
}

impl From<AllergenShare> for IngredientAllergenItem {
    fn from(s: AllergenShare) -> Self {
        IngredientAllergenItem {
            percent: format_percent_display(s.concentration, DISPLAY_DECIMALS),
            allergen_id: s.allergen_id,
            allergen_name: s.allergen_name,
            concentration: s.concentration,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IngredientAllergenListResponse {
    pub items: Vec<IngredientAllergenItem>,
}
