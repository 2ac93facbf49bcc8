//! Catalog seeding tool
//!
//! Run with: cargo run --bin seed_catalog -- --file data/catalog.json
//!
//! The file holds `{"ingredients": [{"name", "measurement_unit"}],
//! "tags": [{"name", "color", "slug"}]}`. Rows already present are skipped,
//! so the tool can be re-run safely.

use std::path::PathBuf;

use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recipe_book::catalog::{CatalogStore, NewIngredient, NewTag};
use recipe_book::Config;

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    ingredients: Vec<NewIngredient>,
    #[serde(default)]
    tags: Vec<NewTag>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipe_book=info,seed_catalog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let path: PathBuf = args
        .iter()
        .position(|a| a == "--file")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("usage: seed_catalog --file <catalog.json>"))?;

    let raw = tokio::fs::read_to_string(&path).await?;
    let catalog: CatalogFile = serde_json::from_str(&raw)?;

    let config = Config::from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await?;

    let store = CatalogStore::new(pool.clone());
    let ingredients = store.seed_ingredients(&catalog.ingredients).await?;
    let tags = store.seed_tags(&catalog.tags).await?;

    tracing::info!(
        file = %path.display(),
        ingredients,
        tags,
        "Catalog seeding finished"
    );

    pool.close().await;
    Ok(())
}
