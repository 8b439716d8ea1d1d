//! DTOs for formula endpoints, including composition editing and
//! allergen exposure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::{ComposedIngredient, ExposureReport, FormulaExposure};
use crate::domain::composition::{AllergenExposure, CompositionRow, RowStatus};
use crate::domain::entities::{Formula, FormulaIngredient};
use crate::domain::percent::{DISPLAY_DECIMALS, format_percent_display};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFormulaRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFormulaRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaItem {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Formula> for FormulaItem {
    fn from(f: Formula) -> Self {
        FormulaItem {
            id: f.id,
            name: f.name,
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FormulaListResponse {
    pub items: Vec<FormulaItem>,
}

/// Request body for `POST /api/formulas/{id}/ingredients`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FormulaIngredientRequest {
    #[validate(range(min = 1))]
    pub ingredient_id: i64,

    #[validate(range(min = 0.0))]
    pub parts: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaIngredientItem {
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub parts: f64,
}

impl From<FormulaIngredient> for FormulaIngredientItem {
    fn from(l: FormulaIngredient) -> Self {
        FormulaIngredientItem {
            ingredient_id: l.ingredient_id,
            ingredient_name: l.ingredient_name,
            parts: l.parts,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FormulaIngredientListResponse {
    pub items: Vec<FormulaIngredientItem>,
}

/// One row of an edited composition.
///
/// Rows still being typed in may lack an ingredient or parts; they are
/// carried along and ignored by calculations.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionRowRequest {
    pub ingredient_id: Option<i64>,

    #[serde(default, deserialize_with = "super::number::optional")]
    pub parts: Option<f64>,

    #[serde(default)]
    pub status: RowStatus,
}

impl From<CompositionRowRequest> for CompositionRow {
    fn from(r: CompositionRowRequest) -> Self {
        CompositionRow {
            ingredient_id: r.ingredient_id,
            parts: r.parts,
            status: r.status,
        }
    }
}

/// Request body for `POST /api/formulas/{id}/allergens/preview`.
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub rows: Vec<CompositionRowRequest>,
}

/// Request body for `PUT /api/formulas/{id}/composition`.
#[derive(Debug, Deserialize, Validate)]
pub struct SyncCompositionRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[serde(default)]
    pub rows: Vec<CompositionRowRequest>,
}

pub fn into_rows(rows: Vec<CompositionRowRequest>) -> Vec<CompositionRow> {
    rows.into_iter().map(Into::into).collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllergenExposureItem {
    pub allergen_id: i64,
    pub name: String,
    pub total: f64,
    pub percent: String,
    pub max_concentration: Option<f64>,
    pub exceeds_limit: bool,
}

impl From<AllergenExposure> for AllergenExposureItem {
    fn from(a: AllergenExposure) -> Self {
        AllergenExposureItem {
            percent: format_percent_display(a.total, DISPLAY_DECIMALS),
            allergen_id: a.allergen_id,
            name: a.name,
            total: a.total,
            max_concentration: a.max_concentration,
            exceeds_limit: a.exceeds_limit,
        }
    }
}

/// Allergen breakdown of a composition.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureResponse {
    pub allergens: Vec<AllergenExposureItem>,
    pub total_exposure: f64,
    pub total_percent: String,
}

impl From<ExposureReport> for ExposureResponse {
    fn from(r: ExposureReport) -> Self {
        ExposureResponse {
            total_percent: format_percent_display(r.total_exposure, DISPLAY_DECIMALS),
            allergens: r.allergens.into_iter().map(Into::into).collect(),
            total_exposure: r.total_exposure,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedIngredientItem {
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub parts: f64,
    pub share: f64,
    pub share_percent: String,
}

impl From<ComposedIngredient> for ComposedIngredientItem {
    fn from(c: ComposedIngredient) -> Self {
        ComposedIngredientItem {
            share_percent: format_percent_display(c.share, DISPLAY_DECIMALS),
            ingredient_id: c.ingredient_id,
            ingredient_name: c.ingredient_name,
            parts: c.parts,
            share: c.share,
        }
    }
}

/// Response of `GET /api/formulas/{id}/allergens`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaExposureResponse {
    pub formula: FormulaItem,
    pub ingredients: Vec<ComposedIngredientItem>,
    #[serde(flatten)]
    pub exposure: ExposureResponse,
}

impl From<FormulaExposure> for FormulaExposureResponse {
    fn from(e: FormulaExposure) -> Self {
        FormulaExposureResponse {
            formula: e.formula.into(),
            ingredients: e.ingredients.into_iter().map(Into::into).collect(),
            exposure: e.report.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_status_defaults_to_existing() {
        let row: CompositionRowRequest =
            serde_json::from_str(r#"{"ingredientId": 4, "parts": "10"}"#).unwrap();

        let row = CompositionRow::from(row);
        assert_eq!(row.status, RowStatus::Existing);
        assert_eq!(row.active(), Some((4, 10.0)));
    }

    #[test]
    fn test_incomplete_rows_are_accepted() {
        let req: PreviewRequest = serde_json::from_str(
            r#"{"rows": [{"ingredientId": null, "parts": ""}, {"status": "new"}]}"#,
        )
        .unwrap();

        let rows = into_rows(req.rows);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.active().is_none()));
    }

    #[test]
    fn test_removed_status_parses() {
        let row: CompositionRowRequest =
            serde_json::from_str(r#"{"ingredientId": 1, "parts": 5, "status": "removed"}"#)
                .unwrap();

        assert_eq!(row.status, RowStatus::Removed);
    }

    #[test]
    fn test_exposure_response_shape() {
        let report = ExposureReport {
            allergens: vec![AllergenExposure {
                allergen_id: 2,
                name: "Limonene".to_string(),
                total: 0.0125,
                max_concentration: Some(0.01),
                exceeds_limit: true,
            }],
            total_exposure: 0.0125,
        };

        let json = serde_json::to_value(ExposureResponse::from(report)).unwrap();
        assert_eq!(json["totalPercent"], "1.2500%");
        assert_eq!(json["allergens"][0]["exceedsLimit"], true);
        assert_eq!(json["allergens"][0]["maxConcentration"], 0.01);
    }
}
