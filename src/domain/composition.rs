//! Allergen exposure of a formula.
//!
//! A formula is a list of ingredients weighted by relative parts. Each
//! ingredient carries an allergen profile: the fraction of its mass that is
//! a given allergen. The exposure of the formula to an allergen is the sum,
//! over ingredients, of `ingredient share * allergen concentration`, where the
//! share is the ingredient's parts divided by the parts of the whole formula.
//!
//! Everything here is a pure function over already-loaded data. Loading the
//! profiles is the caller's job (see
//! [`crate::application::services::CompositionService`]); an ingredient whose
//! profile is missing simply contributes nothing.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Editing state of a composition row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    /// Added in the current edit, not yet saved.
    New,
    /// Loaded from storage.
    #[default]
    Existing,
    /// Marked for deletion; ignored by every calculation.
    Removed,
}

/// One line of a formula, possibly incomplete while it is being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionRow {
    pub ingredient_id: Option<i64>,
    pub parts: Option<f64>,
    pub status: RowStatus,
}

impl CompositionRow {
    /// A saved row with an ingredient and a weight.
    pub fn existing(ingredient_id: i64, parts: f64) -> Self {
        Self {
            ingredient_id: Some(ingredient_id),
            parts: Some(parts),
            status: RowStatus::Existing,
        }
    }

    /// Returns `(ingredient_id, parts)` when the row takes part in calculations.
    ///
    /// Removed rows, rows without an ingredient and rows without a usable
    /// (finite, non-negative) parts value are inactive.
    pub fn active(&self) -> Option<(i64, f64)> {
        if self.status == RowStatus::Removed {
            return None;
        }
        let ingredient_id = self.ingredient_id?;
        let parts = self.parts.filter(|p| p.is_finite() && *p >= 0.0)?;
        Some((ingredient_id, parts))
    }
}

/// An allergen linked to an ingredient, with its concentration in that ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllergenShare {
    pub allergen_id: i64,
    pub allergen_name: String,
    pub concentration: f64,
}

/// Allergen profiles keyed by ingredient id.
pub type AllergenProfiles = HashMap<i64, Vec<AllergenShare>>;

/// Aggregated contribution of one allergen to a whole formula.
#[derive(Debug, Clone, PartialEq)]
pub struct AllergenTotal {
    pub allergen_id: i64,
    pub name: String,
    /// Fraction of the formula's mass (0.01 = 1%).
    pub total: f64,
}

/// An allergen total next to the allergen's regulatory ceiling.
#[derive(Debug, Clone, PartialEq)]
pub struct AllergenExposure {
    pub allergen_id: i64,
    pub name: String,
    pub total: f64,
    pub max_concentration: Option<f64>,
    pub exceeds_limit: bool,
}

/// Fractional weight of an ingredient within its formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IngredientShare {
    pub ingredient_id: i64,
    pub parts: f64,
    pub share: f64,
}

/// Active rows as `(ingredient_id, parts, share)`.
///
/// Parts are divided by the largest one before summing, so the total stays
/// finite for any finite weights. All shares are `0.0` when every part is zero.
fn weighted_rows(rows: &[CompositionRow]) -> Vec<(i64, f64, f64)> {
    let active: Vec<(i64, f64)> = rows.iter().filter_map(CompositionRow::active).collect();
    let largest = active.iter().map(|&(_, parts)| parts).fold(0.0, f64::max);
    if largest <= 0.0 {
        return active.into_iter().map(|(id, parts)| (id, parts, 0.0)).collect();
    }

    let scaled_total: f64 = active.iter().map(|&(_, parts)| parts / largest).sum();
    active
        .into_iter()
        .map(|(id, parts)| (id, parts, parts / largest / scaled_total))
        .collect()
}

/// Computes each allergen's share of the whole formula.
///
/// The result is sorted by `total` descending; allergens with equal totals
/// keep the order in which they were first encountered. The display name
/// of an allergen is the first one seen for its id.
///
/// Returns an empty list when the formula has no active rows or all parts
/// are zero.
pub fn aggregate_allergens(
    rows: &[CompositionRow],
    profiles: &AllergenProfiles,
) -> Vec<AllergenTotal> {
    let weighted = weighted_rows(rows);
    if weighted.iter().all(|&(_, _, share)| share == 0.0) {
        return Vec::new();
    }

    let mut totals: Vec<AllergenTotal> = Vec::new();
    let mut position: HashMap<i64, usize> = HashMap::new();

    for (ingredient_id, _, share) in weighted {
        let Some(profile) = profiles.get(&ingredient_id) else {
            continue;
        };

        for link in profile.iter().filter(|l| l.concentration.is_finite()) {
            let contribution = share * link.concentration;
            match position.get(&link.allergen_id) {
                Some(&idx) => totals[idx].total += contribution,
                None => {
                    position.insert(link.allergen_id, totals.len());
                    totals.push(AllergenTotal {
                        allergen_id: link.allergen_id,
                        name: link.allergen_name.clone(),
                        total: contribution,
                    });
                }
            }
        }
    }

    // sort_by is stable, so ties keep encounter order
    totals.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
    totals
}

/// Sum of all allergen totals: the allergen fraction of the formula as a whole.
pub fn total_exposure(totals: &[AllergenTotal]) -> f64 {
    totals.iter().map(|t| t.total).sum()
}

/// Shares of each active row, in row order.
pub fn ingredient_shares(rows: &[CompositionRow]) -> Vec<IngredientShare> {
    weighted_rows(rows)
        .into_iter()
        .map(|(ingredient_id, parts, share)| IngredientShare {
            ingredient_id,
            parts,
            share,
        })
        .collect()
}

/// Pairs every total with the allergen's maximum concentration, when known.
///
/// The flag is informational: a formula over the ceiling is still valid data.
pub fn annotate_limits(
    totals: Vec<AllergenTotal>,
    limits: &HashMap<i64, f64>,
) -> Vec<AllergenExposure> {
    totals
        .into_iter()
        .map(|t| {
            let max_concentration = limits.get(&t.allergen_id).copied();
            AllergenExposure {
                exceeds_limit: max_concentration.is_some_and(|max| t.total > max),
                allergen_id: t.allergen_id,
                name: t.name,
                total: t.total,
                max_concentration,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn share(allergen_id: i64, name: &str, concentration: f64) -> AllergenShare {
        AllergenShare {
            allergen_id,
            allergen_name: name.to_string(),
            concentration,
        }
    }

    fn totals_by_id(totals: &[AllergenTotal]) -> HashMap<i64, f64> {
        totals.iter().map(|t| (t.allergen_id, t.total)).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_allergens(&[], &AllergenProfiles::new()).is_empty());
    }

    #[test]
    fn test_zero_total_parts_is_empty() {
        let rows = vec![CompositionRow::existing(1, 0.0)];
        let profiles = AllergenProfiles::from([(1, vec![share(9, "Linalool", 0.5)])]);

        assert!(aggregate_allergens(&rows, &profiles).is_empty());
    }

    #[test]
    fn test_weighted_average_of_two_ingredients() {
        let rows = vec![
            CompositionRow::existing(1, 50.0),
            CompositionRow::existing(2, 50.0),
        ];
        let profiles = AllergenProfiles::from([
            (1, vec![share(9, "Linalool", 0.10)]),
            (2, vec![share(9, "Linalool", 0.20)]),
        ]);

        let result = aggregate_allergens(&rows, &profiles);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].allergen_id, 9);
        assert!((result[0].total - 0.15).abs() < EPS);
    }

    #[test]
    fn test_scaling_parts_does_not_change_result() {
        let profiles = AllergenProfiles::from([
            (1, vec![share(9, "Linalool", 0.05), share(3, "Limonene", 0.25)]),
            (2, vec![share(9, "Linalool", 0.03)]),
            (3, vec![share(4, "Citronellol", 0.12)]),
        ]);
        let base = vec![
            CompositionRow::existing(1, 3.0),
            CompositionRow::existing(2, 5.0),
            CompositionRow::existing(3, 2.0),
        ];
        let scaled: Vec<CompositionRow> = base
            .iter()
            .map(|r| CompositionRow::existing(r.ingredient_id.unwrap(), r.parts.unwrap() * 37.5))
            .collect();

        let a = totals_by_id(&aggregate_allergens(&base, &profiles));
        let b = totals_by_id(&aggregate_allergens(&scaled, &profiles));

        assert_eq!(a.len(), b.len());
        for (id, total) in a {
            assert!((total - b[&id]).abs() < EPS);
        }
    }

    #[test]
    fn test_identical_profiles_reproduce_the_profile() {
        let profile = vec![share(1, "Eugenol", 0.02), share(2, "Citral", 0.07)];
        let profiles = AllergenProfiles::from([(10, profile.clone()), (11, profile.clone())]);

        for (a, b) in [(1.0, 1.0), (1.0, 99.0), (0.0, 4.0), (12.5, 0.5)] {
            let rows = vec![
                CompositionRow::existing(10, a),
                CompositionRow::existing(11, b),
            ];
            let totals = totals_by_id(&aggregate_allergens(&rows, &profiles));
            assert!((totals[&1] - 0.02).abs() < EPS);
            assert!((totals[&2] - 0.07).abs() < EPS);
        }
    }

    #[test]
    fn test_missing_profile_contributes_nothing() {
        let rows = vec![
            CompositionRow::existing(1, 1.0),
            CompositionRow::existing(2, 1.0),
        ];
        let profiles = AllergenProfiles::from([(1, vec![share(9, "Linalool", 0.4)])]);

        let result = aggregate_allergens(&rows, &profiles);

        assert_eq!(result.len(), 1);
        assert!((result[0].total - 0.2).abs() < EPS);
    }

    #[test]
    fn test_inactive_rows_are_ignored() {
        let rows = vec![
            CompositionRow::existing(1, 10.0),
            CompositionRow {
                ingredient_id: Some(2),
                parts: Some(90.0),
                status: RowStatus::Removed,
            },
            CompositionRow {
                ingredient_id: None,
                parts: Some(90.0),
                status: RowStatus::New,
            },
            CompositionRow {
                ingredient_id: Some(3),
                parts: None,
                status: RowStatus::New,
            },
            CompositionRow {
                ingredient_id: Some(4),
                parts: Some(f64::NAN),
                status: RowStatus::New,
            },
        ];
        let profiles = AllergenProfiles::from([
            (1, vec![share(9, "Linalool", 0.1)]),
            (2, vec![share(9, "Linalool", 0.9)]),
            (3, vec![share(9, "Linalool", 0.9)]),
            (4, vec![share(9, "Linalool", 0.9)]),
        ]);

        let result = aggregate_allergens(&rows, &profiles);

        assert_eq!(result.len(), 1);
        assert!((result[0].total - 0.1).abs() < EPS);
    }

    #[test]
    fn test_new_rows_count() {
        let rows = vec![CompositionRow {
            ingredient_id: Some(1),
            parts: Some(2.0),
            status: RowStatus::New,
        }];
        let profiles = AllergenProfiles::from([(1, vec![share(9, "Linalool", 0.3)])]);

        let result = aggregate_allergens(&rows, &profiles);

        assert!((result[0].total - 0.3).abs() < EPS);
    }

    #[test]
    fn test_sorted_descending_with_stable_ties() {
        let rows = vec![CompositionRow::existing(1, 1.0)];
        let profiles = AllergenProfiles::from([(
            1,
            vec![
                share(5, "Farnesol", 0.01),
                share(6, "Geraniol", 0.05),
                share(7, "Coumarin", 0.01),
                share(8, "Citral", 0.05),
            ],
        )]);

        let ids: Vec<i64> = aggregate_allergens(&rows, &profiles)
            .iter()
            .map(|t| t.allergen_id)
            .collect();

        assert_eq!(ids, vec![6, 8, 5, 7]);
    }

    #[test]
    fn test_first_seen_name_wins() {
        let rows = vec![
            CompositionRow::existing(1, 1.0),
            CompositionRow::existing(2, 1.0),
        ];
        let profiles = AllergenProfiles::from([
            (1, vec![share(9, "Linalool", 0.1)]),
            (2, vec![share(9, "linalool (old name)", 0.1)]),
        ]);

        let result = aggregate_allergens(&rows, &profiles);

        assert_eq!(result[0].name, "Linalool");
    }

    #[test]
    fn test_more_parts_never_lowers_own_contribution() {
        let profiles = AllergenProfiles::from([
            (1, vec![share(9, "Linalool", 0.2)]),
            (2, vec![share(3, "Limonene", 0.5)]),
        ]);
        let mut previous = 0.0;

        for parts in [0.0, 1.0, 5.0, 20.0, 100.0] {
            let rows = vec![
                CompositionRow::existing(1, parts),
                CompositionRow::existing(2, 10.0),
            ];
            let total = totals_by_id(&aggregate_allergens(&rows, &profiles))
                .get(&9)
                .copied()
                .unwrap_or(0.0);
            assert!(total + EPS >= previous);
            previous = total;
        }
    }

    #[test]
    fn test_total_exposure() {
        let rows = vec![CompositionRow::existing(1, 1.0)];
        let profiles = AllergenProfiles::from([(
            1,
            vec![share(1, "Eugenol", 0.02), share(2, "Citral", 0.03)],
        )]);

        let totals = aggregate_allergens(&rows, &profiles);

        assert!((total_exposure(&totals) - 0.05).abs() < EPS);
        assert_eq!(total_exposure(&[]), 0.0);
    }

    #[test]
    fn test_ingredient_shares() {
        let rows = vec![
            CompositionRow::existing(1, 30.0),
            CompositionRow::existing(2, 10.0),
            CompositionRow {
                ingredient_id: Some(3),
                parts: Some(60.0),
                status: RowStatus::Removed,
            },
        ];

        let shares = ingredient_shares(&rows);

        assert_eq!(shares.len(), 2);
        assert!((shares[0].share - 0.75).abs() < EPS);
        assert!((shares[1].share - 0.25).abs() < EPS);
    }

    #[test]
    fn test_huge_parts_do_not_overflow() {
        let rows = vec![
            CompositionRow::existing(1, 1e308),
            CompositionRow::existing(2, 1e308),
        ];
        let profiles = AllergenProfiles::from([
            (1, vec![share(7, "Coumarin", 0.04)]),
            (2, vec![share(7, "Coumarin", 0.02)]),
        ]);

        let result = aggregate_allergens(&rows, &profiles);

        assert_eq!(result.len(), 1);
        assert!((result[0].total - 0.03).abs() < EPS);

        let shares = ingredient_shares(&rows);
        assert!(shares.iter().all(|s| (s.share - 0.5).abs() < EPS));
        assert_eq!(shares[0].parts, 1e308);
    }

    #[test]
    fn test_ingredient_shares_all_zero() {
        let shares = ingredient_shares(&[CompositionRow::existing(1, 0.0)]);
        assert_eq!(shares[0].share, 0.0);
    }

    #[test]
    fn test_annotate_limits() {
        let totals = vec![
            AllergenTotal {
                allergen_id: 1,
                name: "Eugenol".to_string(),
                total: 0.03,
            },
            AllergenTotal {
                allergen_id: 2,
                name: "Citral".to_string(),
                total: 0.01,
            },
            AllergenTotal {
                allergen_id: 3,
                name: "Coumarin".to_string(),
                total: 0.5,
            },
        ];
        let limits = HashMap::from([(1, 0.02), (2, 0.02)]);

        let annotated = annotate_limits(totals, &limits);

        assert!(annotated[0].exceeds_limit);
        assert_eq!(annotated[0].max_concentration, Some(0.02));
        assert!(!annotated[1].exceeds_limit);
        assert!(!annotated[2].exceeds_limit);
        assert!(annotated[2].max_concentration.is_none());
    }
}
