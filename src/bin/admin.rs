//! CLI administration tool for perfume-formulary.
//!
//! Manages API tokens, loads sample data, shows record counts and checks
//! the database without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a new API token for the default owner
//! cargo run --bin admin -- token create --name "Lab laptop"
//!
//! # Create a token for another tenant
//! cargo run --bin admin -- token create --name "Studio" --owner studio
//!
//! # List and revoke tokens
//! cargo run --bin admin -- token list
//! cargo run --bin admin -- token revoke "Lab laptop"
//!
//! # Replace an owner's records with the sample catalog
//! cargo run --bin admin -- seed --owner public
//!
//! # Record counts and database checks
//! cargo run --bin admin -- stats
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (or `DB_*` components): PostgreSQL connection
//! - `TOKEN_SIGNING_SECRET`: required by `token create`

use perfume_formulary::application::services::hash_token;
use perfume_formulary::domain::entities::{
    AllergenLinkInput, NewAllergen, NewFormula, NewIngredient, OwnerId,
};
use perfume_formulary::domain::repositories::{
    AllergenRepository, FormulaRepository, IngredientRepository, TokenRepository,
};
use perfume_formulary::infrastructure::persistence::{
    PgAllergenRepository, PgFormulaRepository, PgIngredientRepository, PgTokenRepository,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;

/// CLI tool for managing perfume-formulary.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Replace an owner's records with the sample catalog
    Seed {
        /// Owner whose records are replaced
        #[arg(short, long, default_value = OwnerId::DEFAULT)]
        owner: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show record counts
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token
    Create {
        /// Token name (e.g., "Lab laptop")
        #[arg(short, long)]
        name: Option<String>,

        /// Owner the token grants access to
        #[arg(short, long, default_value = OwnerId::DEFAULT)]
        owner: String,

        /// Custom token value (auto-generated if not provided)
        #[arg(short, long)]
        token: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        name_or_id: String,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = database_url()?;
    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Token { action } => handle_token_action(action, &pool).await?,
        Commands::Seed { owner, yes } => seed(&pool, OwnerId::new(owner), yes).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// `DATABASE_URL`, or a URL assembled from `DB_*` components.
fn database_url() -> Result<String> {
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return Ok(url);
    }

    let var = |key: &str| std::env::var(key).with_context(|| format!("{key} must be set"));
    let host = std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = std::env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());

    Ok(format!(
        "postgres://{}:{}@{}:{}/{}",
        var("DB_USER")?,
        var("DB_PASSWORD")?,
        host,
        port,
        var("DB_NAME")?
    ))
}

async fn handle_token_action(action: TokenAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgTokenRepository::new(Arc::new(pool.clone())));

    match action {
        TokenAction::Create {
            name,
            owner,
            token,
            yes,
        } => create_token(repo, name, owner, token, yes).await?,
        TokenAction::List => list_tokens(repo).await?,
        TokenAction::Revoke { name_or_id } => revoke_token(repo, name_or_id).await?,
    }

    Ok(())
}

/// Creates a new API token with interactive prompts.
///
/// Only the HMAC of the token is stored; the raw value is shown once.
async fn create_token(
    repo: Arc<PgTokenRepository>,
    name: Option<String>,
    owner: String,
    token: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "Create API Token".bright_blue().bold());
    println!();

    let secret =
        std::env::var("TOKEN_SIGNING_SECRET").context("TOKEN_SIGNING_SECRET must be set")?;

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("Lab laptop")
            .interact_text()?,
    };

    let token_value = match token {
        Some(t) => {
            println!("{}", "Using provided token value".yellow());
            t
        }
        None => generate_token(),
    };

    println!();
    println!("{}", "Token details:".bright_white().bold());
    println!("  Name:  {}", token_name.cyan());
    println!("  Owner: {}", owner.cyan());
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let token_hash = hash_token(&secret, &token_value)
        .map_err(|e| anyhow::anyhow!("Failed to hash token: {}", e))?;

    repo.create_token(&token_name, &token_hash, &owner)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!();
    println!("{}", "Token created successfully!".green().bold());
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/formulas",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

async fn list_tokens(repo: Arc<PgTokenRepository>) -> Result<()> {
    println!("{}", "API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        println!();
        println!(
            "  Create one with: {} admin token create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<4} {:<28} {:<14} {:<17} {:<17} {:<8}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Owner".bright_white().bold(),
        "Created".bright_white().bold(),
        "Last used".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "-".repeat(92).bright_black());

    for token in &tokens {
        let status = if token.revoked_at.is_some() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };

        let last_used = token
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<4} {:<28} {:<14} {:<17} {:<17} {}",
            token.id.to_string().bright_black(),
            token.name.cyan(),
            token.owner_id,
            token
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            last_used.bright_black(),
            status
        );
    }

    println!();
    println!(
        "  Total: {}",
        tokens.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Revokes a token by name or ID after confirmation.
async fn revoke_token(repo: Arc<PgTokenRepository>, name_or_id: String) -> Result<()> {
    println!("{}", "Revoke API Token".bright_blue().bold());
    println!();

    let token = match name_or_id.parse::<i64>() {
        Ok(id) => repo.find_by_id(id).await,
        Err(_) => repo.find_by_name(&name_or_id).await,
    }
    .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
    .context("Token not found")?;

    if token.revoked_at.is_some() {
        println!("{}", "This token is already revoked".yellow());
        return Ok(());
    }

    println!("  Token: {}", token.name.cyan());
    println!("  Owner: {}", token.owner_id.cyan());
    println!("  ID:    {}", token.id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke this token?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "Cancelled".red());
        return Ok(());
    }

    repo.revoke_token(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    println!();
    println!("{}", "Token revoked successfully!".green().bold());
    println!();

    Ok(())
}

const SEED_INGREDIENTS: &[&str] = &[
    "Bergamot",
    "Rose Absolute",
    "Sandalwood",
    "Jasmine Sambac",
    "Cedarwood Atlas",
    "Vanillin",
];

const SEED_ALLERGENS: &[&str] = &["Limonene", "Linalool", "Citral", "Citronellol", "Eugenol"];

/// (ingredient, allergen, concentration)
const SEED_PROFILES: &[(&str, &str, f64)] = &[
    ("Bergamot", "Limonene", 0.25),
    ("Bergamot", "Linalool", 0.05),
    ("Rose Absolute", "Citronellol", 0.12),
    ("Jasmine Sambac", "Linalool", 0.03),
    ("Sandalwood", "Eugenol", 0.01),
];

/// (formula, [(ingredient, parts)]); parts add up to 100.
const SEED_FORMULAS: &[(&str, &[(&str, f64)])] = &[
    (
        "Citrus Prelude",
        &[
            ("Bergamot", 45.0),
            ("Jasmine Sambac", 10.0),
            ("Sandalwood", 15.0),
            ("Vanillin", 30.0),
        ],
    ),
    (
        "Rose Velvet",
        &[
            ("Rose Absolute", 55.0),
            ("Sandalwood", 20.0),
            ("Vanillin", 25.0),
        ],
    ),
    (
        "Woodland Whisper",
        &[
            ("Cedarwood Atlas", 50.0),
            ("Sandalwood", 35.0),
            ("Jasmine Sambac", 15.0),
        ],
    ),
];

/// Deletes every formula, ingredient and allergen of `owner`, then loads
/// the sample catalog.
async fn seed(pool: &PgPool, owner: OwnerId, skip_confirm: bool) -> Result<()> {
    println!("{}", "Seed sample catalog".bright_blue().bold());
    println!();
    println!(
        "  All formulas, ingredients and allergens of owner {} will be replaced.",
        owner.as_str().cyan()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Continue?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    clear_owner(pool, &owner).await?;

    let shared = Arc::new(pool.clone());
    let ingredients = PgIngredientRepository::new(shared.clone());
    let allergens = PgAllergenRepository::new(shared.clone());
    let formulas = PgFormulaRepository::new(shared);

    let mut allergen_ids = HashMap::new();
    for name in SEED_ALLERGENS {
        let allergen = allergens
            .create(
                &owner,
                NewAllergen {
                    name: name.to_string(),
                    cas_number: None,
                    max_concentration: None,
                },
            )
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create allergen {name}: {e}"))?;
        allergen_ids.insert(*name, allergen.id);
    }

    let mut ingredient_ids = HashMap::new();
    for name in SEED_INGREDIENTS {
        let links = SEED_PROFILES
            .iter()
            .filter(|(ingredient, _, _)| ingredient == name)
            .map(|(_, allergen, concentration)| {
                lookup(&allergen_ids, allergen).map(|allergen_id| AllergenLinkInput {
                    allergen_id,
                    concentration: *concentration,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let ingredient = ingredients
            .create(
                &owner,
                NewIngredient {
                    name: name.to_string(),
                    allergens: links,
                },
            )
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create ingredient {name}: {e}"))?;
        ingredient_ids.insert(*name, ingredient.id);
    }

    for (name, lines) in SEED_FORMULAS {
        let formula = formulas
            .create(
                &owner,
                NewFormula {
                    name: name.to_string(),
                },
            )
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create formula {name}: {e}"))?;

        let upserts = lines
            .iter()
            .map(|(ingredient, parts)| lookup(&ingredient_ids, ingredient).map(|id| (id, *parts)))
            .collect::<Result<Vec<_>>>()?;

        formulas
            .sync_composition(&owner, formula.id, None, upserts, Vec::new())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to compose formula {name}: {e}"))?;
    }

    println!(
        "{}",
        format!(
            "Seeded {} allergens, {} ingredients and {} formulas",
            SEED_ALLERGENS.len(),
            SEED_INGREDIENTS.len(),
            SEED_FORMULAS.len()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}

fn lookup(ids: &HashMap<&str, i64>, name: &str) -> Result<i64> {
    ids.get(name)
        .copied()
        .with_context(|| format!("Seed data refers to unknown record {name}"))
}

/// Removes an owner's records in foreign key order.
async fn clear_owner(pool: &PgPool, owner: &OwnerId) -> Result<()> {
    let mut tx = pool.begin().await?;

    for table in [
        "formula_ingredients",
        "formulas",
        "ingredient_allergens",
        "allergens",
        "ingredients",
    ] {
        sqlx::query(&format!("DELETE FROM {table} WHERE owner_id = $1"))
            .bind(owner.as_str())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to clear {table}"))?;
    }

    tx.commit().await?;
    Ok(())
}

/// Displays record counts across all owners.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let shared = Arc::new(pool.clone());
    let count = |result: Result<i64, perfume_formulary::AppError>| {
        result.map_err(|e| anyhow::anyhow!("Failed to count records: {}", e))
    };

    let ingredients = count(PgIngredientRepository::new(shared.clone()).count().await)?;
    let allergens = count(PgAllergenRepository::new(shared.clone()).count().await)?;
    let formulas = count(PgFormulaRepository::new(shared).count().await)?;

    let owners: i64 = sqlx::query_scalar(
        "SELECT COUNT(DISTINCT owner_id) FROM api_tokens WHERE revoked_at IS NULL",
    )
    .fetch_one(pool)
    .await?;

    let tokens_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL")
            .fetch_one(pool)
            .await?;

    println!(
        "  Ingredients:   {}",
        ingredients.to_string().bright_green().bold()
    );
    println!(
        "  Allergens:     {}",
        allergens.to_string().bright_green().bold()
    );
    println!(
        "  Formulas:      {}",
        formulas.to_string().bright_green().bold()
    );
    println!(
        "  Active tokens: {} ({} owners)",
        tokens_count.to_string().bright_green().bold(),
        owners
    );
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM _sqlx_migrations WHERE success",
            )
            .fetch_one(pool)
            .await
            .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}

/// Generates a random 48-character alphanumeric token (~286 bits).
fn generate_token() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const TOKEN_LEN: usize = 48;

    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
