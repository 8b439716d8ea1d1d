mod common;

use perfume_formulary::domain::entities::{
    AllergenLinkInput, AllergenPatch, NewAllergen, NewIngredient, OwnerId,
};
use perfume_formulary::domain::repositories::{AllergenRepository, IngredientRepository};
use perfume_formulary::error::AppError;
use perfume_formulary::infrastructure::persistence::{PgAllergenRepository, PgIngredientRepository};
use sqlx::PgPool;
use std::sync::Arc;

fn owner() -> OwnerId {
    OwnerId::new("public")
}

fn repos(pool: PgPool) -> (PgIngredientRepository, PgAllergenRepository) {
    let pool = Arc::new(pool);
    (
        PgIngredientRepository::new(pool.clone()),
        PgAllergenRepository::new(pool),
    )
}

async fn allergen(repo: &PgAllergenRepository, name: &str, max: Option<f64>) -> i64 {
    repo.create(
        &owner(),
        NewAllergen {
            name: name.to_string(),
            cas_number: None,
            max_concentration: max,
        },
    )
    .await
    .unwrap()
    .id
}

// ─── INGREDIENTS ─────────────────────────────────────────────────────────────

#[sqlx::test]
async fn test_create_ingredient_with_links(pool: PgPool) {
    let (ingredients, allergens) = repos(pool);
    let limonene = allergen(&allergens, "Limonene", None).await;
    let linalool = allergen(&allergens, "Linalool", None).await;

    let created = ingredients
        .create(
            &owner(),
            NewIngredient {
                name: "Bergamot".to_string(),
                allergens: vec![
                    AllergenLinkInput {
                        allergen_id: linalool,
                        concentration: 0.05,
                    },
                    AllergenLinkInput {
                        allergen_id: limonene,
                        concentration: 0.25,
                    },
                ],
            },
        )
        .await
        .unwrap();

    assert_eq!(created.name, "Bergamot");
    assert_eq!(created.owner_id, "public");

    let profile = ingredients.list_allergens(&owner(), created.id).await.unwrap();
    let names: Vec<&str> = profile.iter().map(|s| s.allergen_name.as_str()).collect();
    assert_eq!(names, vec!["Limonene", "Linalool"]);
}

#[sqlx::test]
async fn test_create_ingredient_rolls_back_on_bad_link(pool: PgPool) {
    let (ingredients, _) = repos(pool);

    let result = ingredients
        .create(
            &owner(),
            NewIngredient {
                name: "Bergamot".to_string(),
                allergens: vec![AllergenLinkInput {
                    allergen_id: 9999,
                    concentration: 0.1,
                }],
            },
        )
        .await;

    assert!(result.is_err());
    assert!(ingredients.list(&owner()).await.unwrap().is_empty());
}

#[sqlx::test]
async fn test_list_ingredients_is_owner_scoped_and_sorted(pool: PgPool) {
    common::insert_ingredient(&pool, "public", "Vetiver").await;
    common::insert_ingredient(&pool, "public", "Ambrette").await;
    common::insert_ingredient(&pool, "studio", "Benzoin").await;
    let (ingredients, _) = repos(pool);

    let list = ingredients.list(&owner()).await.unwrap();

    let names: Vec<&str> = list.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Ambrette", "Vetiver"]);
    assert_eq!(ingredients.count().await.unwrap(), 3);
}

#[sqlx::test]
async fn test_rename_missing_ingredient(pool: PgPool) {
    let (ingredients, _) = repos(pool);

    let result = ingredients.rename(&owner(), 9999, "Ghost").await;

    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
async fn test_upsert_and_delete_link(pool: PgPool) {
    let id = common::insert_ingredient(&pool, "public", "Rose Absolute").await;
    let (ingredients, allergens) = repos(pool);
    let citronellol = allergen(&allergens, "Citronellol", None).await;
    let link = |concentration| AllergenLinkInput {
        allergen_id: citronellol,
        concentration,
    };

    ingredients.upsert_allergen(&owner(), id, link(0.10)).await.unwrap();
    let share = ingredients.upsert_allergen(&owner(), id, link(0.12)).await.unwrap();

    assert_eq!(share.allergen_name, "Citronellol");
    assert_eq!(share.concentration, 0.12);
    assert_eq!(ingredients.list_allergens(&owner(), id).await.unwrap().len(), 1);

    assert!(ingredients.delete_allergen(&owner(), id, citronellol).await.unwrap());
    assert!(!ingredients.delete_allergen(&owner(), id, citronellol).await.unwrap());
}

#[sqlx::test]
async fn test_overview_rows_cover_all_links(pool: PgPool) {
    let bergamot = common::insert_ingredient(&pool, "public", "Bergamot").await;
    let jasmine = common::insert_ingredient(&pool, "public", "Jasmine Sambac").await;
    let linalool = common::insert_allergen(&pool, "public", "Linalool", None).await;
    common::link_allergen(&pool, "public", bergamot, linalool, 0.05).await;
    common::link_allergen(&pool, "public", jasmine, linalool, 0.03).await;
    let (ingredients, _) = repos(pool);

    let rows = ingredients.list_all_allergen_rows(&owner()).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.allergen_name.as_deref() == Some("Linalool")));
}

#[sqlx::test]
async fn test_delete_ingredient_drops_links(pool: PgPool) {
    let id = common::insert_ingredient(&pool, "public", "Bergamot").await;
    let limonene = common::insert_allergen(&pool, "public", "Limonene", None).await;
    common::link_allergen(&pool, "public", id, limonene, 0.25).await;
    let (ingredients, allergens) = repos(pool);

    assert!(ingredients.delete(&owner(), id).await.unwrap());
    assert_eq!(allergens.count_links(&owner(), limonene).await.unwrap(), 0);
}

#[sqlx::test]
async fn test_count_formula_usages(pool: PgPool) {
    let id = common::insert_ingredient(&pool, "public", "Bergamot").await;
    let formula = common::insert_formula(&pool, "public", "Citrus Prelude").await;
    common::add_to_formula(&pool, "public", formula, id, 45.0).await;
    let (ingredients, _) = repos(pool);

    assert_eq!(ingredients.count_formula_usages(&owner(), id).await.unwrap(), 1);
}

// ─── ALLERGENS ───────────────────────────────────────────────────────────────

#[sqlx::test]
async fn test_update_allergen_patch_semantics(pool: PgPool) {
    let (_, allergens) = repos(pool);
    let created = allergens
        .create(
            &owner(),
            NewAllergen {
                name: "Citral".to_string(),
                cas_number: Some("5392-40-5".to_string()),
                max_concentration: Some(0.01),
            },
        )
        .await
        .unwrap();

    let renamed = allergens
        .update(
            &owner(),
            created.id,
            AllergenPatch {
                name: Some("Citral (natural)".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.cas_number.as_deref(), Some("5392-40-5"));
    assert_eq!(renamed.max_concentration, Some(0.01));

    let cleared = allergens
        .update(
            &owner(),
            created.id,
            AllergenPatch {
                cas_number: Some(None),
                max_concentration: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.name, "Citral (natural)");
    assert!(cleared.cas_number.is_none());
    assert!(cleared.max_concentration.is_none());
}

#[sqlx::test]
async fn test_update_allergen_of_other_owner(pool: PgPool) {
    let foreign = common::insert_allergen(&pool, "studio", "Coumarin", None).await;
    let (_, allergens) = repos(pool);

    let result = allergens
        .update(
            &owner(),
            foreign,
            AllergenPatch {
                name: Some("Mine".to_string()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
async fn test_max_concentrations_skips_unset(pool: PgPool) {
    let (_, allergens) = repos(pool);
    let with_limit = allergen(&allergens, "Eugenol", Some(0.005)).await;
    let without = allergen(&allergens, "Linalool", None).await;

    let limits = allergens
        .max_concentrations(&owner(), vec![with_limit, without])
        .await
        .unwrap();

    assert_eq!(limits.len(), 1);
    assert_eq!(limits.get(&with_limit), Some(&0.005));
    assert!(allergens.max_concentrations(&owner(), vec![]).await.unwrap().is_empty());
}

#[sqlx::test]
async fn test_delete_linked_allergen_is_refused_by_database(pool: PgPool) {
    let id = common::insert_ingredient(&pool, "public", "Bergamot").await;
    let limonene = common::insert_allergen(&pool, "public", "Limonene", None).await;
    common::link_allergen(&pool, "public", id, limonene, 0.25).await;
    let (_, allergens) = repos(pool);

    let result = allergens.delete(&owner(), limonene).await;

    assert!(matches!(result, Err(AppError::InUse { .. })));
}

#[sqlx::test]
async fn test_linked_ingredient_ids(pool: PgPool) {
    let bergamot = common::insert_ingredient(&pool, "public", "Bergamot").await;
    let lemon = common::insert_ingredient(&pool, "public", "Lemon").await;
    let vetiver = common::insert_ingredient(&pool, "public", "Vetiver").await;
    let limonene = common::insert_allergen(&pool, "public", "Limonene", None).await;
    common::link_allergen(&pool, "public", lemon, limonene, 0.65).await;
    common::link_allergen(&pool, "public", bergamot, limonene, 0.25).await;
    let (_, allergens) = repos(pool);

    let ids = allergens.linked_ingredient_ids(&owner(), limonene).await.unwrap();

    assert_eq!(ids, vec![bergamot, lemon]);
    assert!(!ids.contains(&vetiver));
    assert!(
        allergens
            .linked_ingredient_ids(&OwnerId::new("studio"), limonene)
            .await
            .unwrap()
            .is_empty()
    );
}
