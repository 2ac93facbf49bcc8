//! Common test utilities
//!
//! Integration tests need PostgreSQL at DATABASE_URL. Without it,
//! `setup_test_db` returns `None` and the calling test exits early.
//! Tests never truncate: every test creates its own users, catalog rows and
//! recipes with unique names so they can run in parallel.
#![allow(dead_code)]

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use tempfile::TempDir;
use uuid::Uuid;

use recipe_book::aggregate::{IngredientLine, Recipe, RecipeDraft};
use recipe_book::handlers::{CreateRecipeCommand, CreateRecipeHandler};
use recipe_book::media::{FsImageStore, ImageStore};
use recipe_book::OperationContext;

pub const API_KEY: &str = "test_key_123";

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Connect, apply the schema and seed the test API key
pub async fn setup_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set; skipping database test");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    let mut tx = pool.begin().await.expect("Failed to begin transaction");

    // Parallel tests apply the schema one at a time
    sqlx::query("SELECT pg_advisory_xact_lock(727001)")
        .execute(&mut *tx)
        .await
        .expect("Failed to take schema lock");
    (&mut *tx)
        .execute(SCHEMA)
        .await
        .expect("Failed to apply schema");

    // Compute hash the same way the middleware does
    let key_hash: String =
        sqlx::query_scalar("SELECT encode(sha256($1::bytea), 'hex')")
            .bind(API_KEY.as_bytes())
            .fetch_one(&mut *tx)
            .await
            .unwrap();

    sqlx::query(
        r#"
        INSERT INTO api_keys (id, name, key_hash, key_prefix, permissions, is_active)
        VALUES ($1, $2, $3, $4, $5, TRUE)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind("Test Key")
    .bind(&key_hash)
    .bind("test_")
    .bind(vec!["admin".to_string()])
    .execute(&mut *tx)
    .await
    .expect("Failed to seed API key");

    tx.commit().await.expect("Failed to commit transaction");

    Some(pool)
}

/// Short unique token for names that must not collide across tests
pub fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
}

pub async fn create_user(pool: &PgPool, prefix: &str) -> i64 {
    let username = unique(prefix);
    sqlx::query_scalar(
        r#"
        INSERT INTO users (email, username, first_name, last_name)
        VALUES ($1, $2, 'Test', 'Cook')
        RETURNING id
        "#,
    )
    .bind(format!("{}@example.com", username))
    .bind(&username)
    .fetch_one(pool)
    .await
    .expect("Failed to create user")
}

pub async fn create_ingredient(pool: &PgPool, name: &str, unit: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO ingredients (name, measurement_unit) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(unit)
    .fetch_one(pool)
    .await
    .expect("Failed to create ingredient")
}

/// Returns (id, slug)
pub async fn create_tag(pool: &PgPool, prefix: &str) -> (i64, String) {
    let slug = unique(prefix);
    let id = sqlx::query_scalar(
        "INSERT INTO tags (name, color, slug) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(format!("{} name", slug))
    .bind(format!("#{}", slug))
    .bind(&slug)
    .fetch_one(pool)
    .await
    .expect("Failed to create tag");
    (id, slug)
}

pub fn png_data_uri(payload: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(payload))
}

/// Filesystem image store under a fresh temporary directory. Keep the
/// `TempDir` alive for as long as the store is used.
pub fn image_store() -> (TempDir, Arc<dyn ImageStore>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store: Arc<dyn ImageStore> = Arc::new(FsImageStore::new(dir.path()));
    (dir, store)
}

pub fn draft(name: &str, ingredients: &[(i64, i64)], tag_ids: &[i64]) -> RecipeDraft {
    RecipeDraft {
        name: name.to_string(),
        text: format!("How to make {}", name),
        cooking_time: 15,
        tag_ids: tag_ids.to_vec(),
        ingredients: ingredients
            .iter()
            .map(|(id, amount)| IngredientLine::new(*id, *amount))
            .collect(),
    }
}

pub async fn create_recipe(
    pool: &PgPool,
    images: Arc<dyn ImageStore>,
    author_id: i64,
    name: &str,
    ingredients: &[(i64, i64)],
    tag_ids: &[i64],
) -> Recipe {
    let handler = CreateRecipeHandler::new(pool.clone(), images);
    let context = OperationContext::new().with_request_user(author_id);
    handler
        .execute(
            CreateRecipeCommand::new(draft(name, ingredients, tag_ids), png_data_uri(name.as_bytes())),
            &context,
        )
        .await
        .expect("Failed to create recipe")
}
