//! Ingredient catalog service.

use std::sync::Arc;

use crate::domain::composition::AllergenShare;
use crate::domain::entities::{AllergenLinkInput, Ingredient, NewIngredient, OwnerId};
use crate::domain::repositories::{AllergenRepository, IngredientRepository};
use crate::domain::summary::{IngredientSummary, summarize_ingredients};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::validation::{normalize_name, validate_id, validate_quantity};
use serde_json::json;

/// Service for ingredients and their allergen profiles.
///
/// Any write to an ingredient's allergen links drops the cached profile of
/// that ingredient so exposure calculations see the change immediately.
pub struct IngredientService<I: IngredientRepository, A: AllergenRepository> {
    ingredients: Arc<I>,
    allergens: Arc<A>,
    cache: Arc<dyn CacheService>,
}

impl<I: IngredientRepository, A: AllergenRepository> IngredientService<I, A> {
    /// Creates a new ingredient service.
    pub fn new(ingredients: Arc<I>, allergens: Arc<A>, cache: Arc<dyn CacheService>) -> Self {
        Self {
            ingredients,
            allergens,
            cache,
        }
    }

    /// Creates an ingredient with an optional initial allergen profile.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a blank name or a bad link.
    /// Returns [`AppError::NotFound`] if a linked allergen does not exist.
    pub async fn create_ingredient(
        &self,
        owner: &OwnerId,
        name: &str,
        allergens: Vec<AllergenLinkInput>,
    ) -> Result<Ingredient, AppError> {
        let name = normalize_name("name", name)?;

        for link in &allergens {
            self.check_link(owner, link).await?;
        }

        self.ingredients
            .create(owner, NewIngredient { name, allergens })
            .await
    }

    /// Lists ingredients by name with their allergen overview.
    pub async fn list_summaries(&self, owner: &OwnerId) -> Result<Vec<IngredientSummary>, AppError> {
        let ingredients = self.ingredients.list(owner).await?;
        let links = self.ingredients.list_all_allergen_rows(owner).await?;

        Ok(summarize_ingredients(ingredients, links))
    }

    /// Lists ingredients by name.
    pub async fn list_ingredients(&self, owner: &OwnerId) -> Result<Vec<Ingredient>, AppError> {
        self.ingredients.list(owner).await
    }

    /// Retrieves an ingredient by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the ingredient does not exist.
    pub async fn get_ingredient(&self, owner: &OwnerId, id: i64) -> Result<Ingredient, AppError> {
        self.ingredients
            .find_by_id(owner, id)
            .await?
            .ok_or_else(|| ingredient_not_found(id))
    }

    pub async fn rename_ingredient(
        &self,
        owner: &OwnerId,
        id: i64,
        name: &str,
    ) -> Result<Ingredient, AppError> {
        let name = normalize_name("name", name)?;
        self.ingredients.rename(owner, id, &name).await
    }

    /// Deletes an ingredient that no formula uses.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InUse`] if any formula still contains it.
    /// Returns [`AppError::NotFound`] if the ingredient does not exist.
    pub async fn delete_ingredient(&self, owner: &OwnerId, id: i64) -> Result<(), AppError> {
        let usages = self.ingredients.count_formula_usages(owner, id).await?;
        if usages > 0 {
            return Err(AppError::in_use(
                "Ingredient is used in formulas",
                json!({ "id": id, "formulas": usages }),
            ));
        }

        if !self.ingredients.delete(owner, id).await? {
            return Err(ingredient_not_found(id));
        }

        self.invalidate(owner, id).await;
        Ok(())
    }

    /// Allergen profile of an ingredient, ordered by allergen name.
    pub async fn list_allergens(
        &self,
        owner: &OwnerId,
        ingredient_id: i64,
    ) -> Result<Vec<AllergenShare>, AppError> {
        self.get_ingredient(owner, ingredient_id).await?;
        self.ingredients.list_allergens(owner, ingredient_id).await
    }

    /// Adds an allergen to an ingredient, or changes its concentration.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the ingredient or the allergen does not exist.
    pub async fn upsert_allergen(
        &self,
        owner: &OwnerId,
        ingredient_id: i64,
        link: AllergenLinkInput,
    ) -> Result<AllergenShare, AppError> {
        self.get_ingredient(owner, ingredient_id).await?;
        self.check_link(owner, &link).await?;

        let share = self
            .ingredients
            .upsert_allergen(owner, ingredient_id, link)
            .await?;

        self.invalidate(owner, ingredient_id).await;
        Ok(share)
    }

    /// Removes an allergen from an ingredient. Removing a missing link succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the ingredient does not exist.
    pub async fn delete_allergen(
        &self,
        owner: &OwnerId,
        ingredient_id: i64,
        allergen_id: i64,
    ) -> Result<(), AppError> {
        self.get_ingredient(owner, ingredient_id).await?;

        if self
            .ingredients
            .delete_allergen(owner, ingredient_id, allergen_id)
            .await?
        {
            self.invalidate(owner, ingredient_id).await;
        }
        Ok(())
    }

    async fn check_link(&self, owner: &OwnerId, link: &AllergenLinkInput) -> Result<(), AppError> {
        validate_id("allergenId", link.allergen_id)?;
        validate_quantity("concentration", link.concentration)?;

        if self
            .allergens
            .find_by_id(owner, link.allergen_id)
            .await?
            .is_none()
        {
            return Err(AppError::not_found(
                "Allergen not found",
                json!({ "id": link.allergen_id }),
            ));
        }
        Ok(())
    }

    async fn invalidate(&self, owner: &OwnerId, ingredient_id: i64) {
        if let Err(e) = self.cache.invalidate_profile(owner, ingredient_id).await {
            tracing::warn!(ingredient_id, error = %e, "Failed to invalidate profile cache");
        }
    }
}

fn ingredient_not_found(id: i64) -> AppError {
    AppError::not_found("Ingredient not found", json!({ "id": id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Allergen, IngredientAllergenRow};
    use crate::domain::repositories::{MockAllergenRepository, MockIngredientRepository};
    use crate::infrastructure::cache::{MockCacheService, NullCache};
    use chrono::Utc;

    fn ingredient(id: i64, name: &str) -> Ingredient {
        Ingredient::new(id, name.to_string(), "public".to_string(), Utc::now(), Utc::now())
    }

    fn allergen(id: i64, name: &str) -> Allergen {
        Allergen::new(
            id,
            name.to_string(),
            None,
            None,
            "public".to_string(),
            Utc::now(),
            Utc::now(),
        )
    }

    fn service(
        ingredients: MockIngredientRepository,
        allergens: MockAllergenRepository,
    ) -> IngredientService<MockIngredientRepository, MockAllergenRepository> {
        IngredientService::new(Arc::new(ingredients), Arc::new(allergens), Arc::new(NullCache))
    }

    #[tokio::test]
    async fn test_create_trims_name_and_checks_allergens() {
        let mut ingredients = MockIngredientRepository::new();
        let mut allergens = MockAllergenRepository::new();

        allergens
            .expect_find_by_id()
            .withf(|_, id| *id == 10)
            .times(1)
            .returning(|_, id| Ok(Some(allergen(id, "Limonene"))));

        ingredients
            .expect_create()
            .withf(|_, new| new.name == "Bergamot" && new.allergens.len() == 1)
            .times(1)
            .returning(|_, new| Ok(ingredient(1, &new.name)));

        let created = service(ingredients, allergens)
            .create_ingredient(
                &OwnerId::default(),
                "  Bergamot ",
                vec![AllergenLinkInput {
                    allergen_id: 10,
                    concentration: 0.25,
                }],
            )
            .await
            .unwrap();

        assert_eq!(created.name, "Bergamot");
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let mut ingredients = MockIngredientRepository::new();
        ingredients.expect_create().times(0);

        let result = service(ingredients, MockAllergenRepository::new())
            .create_ingredient(&OwnerId::default(), "   ", vec![])
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_with_unknown_allergen_is_not_found() {
        let mut ingredients = MockIngredientRepository::new();
        let mut allergens = MockAllergenRepository::new();

        allergens.expect_find_by_id().returning(|_, _| Ok(None));
        ingredients.expect_create().times(0);

        let result = service(ingredients, allergens)
            .create_ingredient(
                &OwnerId::default(),
                "Bergamot",
                vec![AllergenLinkInput {
                    allergen_id: 99,
                    concentration: 0.1,
                }],
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_create_rejects_negative_concentration() {
        let result = service(MockIngredientRepository::new(), MockAllergenRepository::new())
            .create_ingredient(
                &OwnerId::default(),
                "Bergamot",
                vec![AllergenLinkInput {
                    allergen_id: 1,
                    concentration: -0.5,
                }],
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_delete_used_ingredient_is_rejected() {
        let mut ingredients = MockIngredientRepository::new();

        ingredients
            .expect_count_formula_usages()
            .times(1)
            .returning(|_, _| Ok(2));
        ingredients.expect_delete().times(0);

        let result = service(ingredients, MockAllergenRepository::new())
            .delete_ingredient(&OwnerId::default(), 1)
            .await;

        assert!(matches!(result, Err(AppError::InUse { .. })));
    }

    #[tokio::test]
    async fn test_delete_missing_ingredient_is_not_found() {
        let mut ingredients = MockIngredientRepository::new();

        ingredients
            .expect_count_formula_usages()
            .returning(|_, _| Ok(0));
        ingredients.expect_delete().returning(|_, _| Ok(false));

        let result = service(ingredients, MockAllergenRepository::new())
            .delete_ingredient(&OwnerId::default(), 42)
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_summaries_combines_links() {
        let mut ingredients = MockIngredientRepository::new();

        ingredients
            .expect_list()
            .returning(|_| Ok(vec![ingredient(1, "Bergamot"), ingredient(2, "Vanillin")]));
        ingredients.expect_list_all_allergen_rows().returning(|_| {
            Ok(vec![IngredientAllergenRow {
                ingredient_id: 1,
                allergen_id: 10,
                allergen_name: Some("Limonene".to_string()),
                concentration: 0.25,
            }])
        });

        let summaries = service(ingredients, MockAllergenRepository::new())
            .list_summaries(&OwnerId::default())
            .await
            .unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].allergen_count, 1);
        assert_eq!(summaries[1].allergen_count, 0);
    }

    #[tokio::test]
    async fn test_upsert_allergen_invalidates_cached_profile() {
        let mut ingredients = MockIngredientRepository::new();
        let mut allergens = MockAllergenRepository::new();
        let mut cache = MockCacheService::new();

        ingredients
            .expect_find_by_id()
            .returning(|_, id| Ok(Some(ingredient(id, "Bergamot"))));
        allergens
            .expect_find_by_id()
            .returning(|_, id| Ok(Some(allergen(id, "Limonene"))));
        ingredients.expect_upsert_allergen().returning(|_, _, link| {
            Ok(AllergenShare {
                allergen_id: link.allergen_id,
                allergen_name: "Limonene".to_string(),
                concentration: link.concentration,
            })
        });
        cache
            .expect_invalidate_profile()
            .withf(|_, id| *id == 1)
            .times(1)
            .returning(|_, _| Ok(()));

        let service =
            IngredientService::new(Arc::new(ingredients), Arc::new(allergens), Arc::new(cache));

        let share = service
            .upsert_allergen(
                &OwnerId::default(),
                1,
                AllergenLinkInput {
                    allergen_id: 10,
                    concentration: 0.3,
                },
            )
            .await
            .unwrap();

        assert_eq!(share.concentration, 0.3);
    }

    #[tokio::test]
    async fn test_delete_allergen_is_idempotent() {
        let mut ingredients = MockIngredientRepository::new();

        ingredients
            .expect_find_by_id()
            .returning(|_, id| Ok(Some(ingredient(id, "Bergamot"))));
        ingredients
            .expect_delete_allergen()
            .returning(|_, _, _| Ok(false));

        let result = service(ingredients, MockAllergenRepository::new())
            .delete_allergen(&OwnerId::default(), 1, 10)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_allergen_of_missing_ingredient() {
        let mut ingredients = MockIngredientRepository::new();

        ingredients.expect_find_by_id().returning(|_, _| Ok(None));
        ingredients.expect_delete_allergen().times(0);

        let result = service(ingredients, MockAllergenRepository::new())
            .delete_allergen(&OwnerId::default(), 1, 10)
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }
}
