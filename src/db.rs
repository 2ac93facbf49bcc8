//! Database module
//!
//! Connectivity and schema checks. The schema itself lives in
//! `migrations/` as plain SQL.

use sqlx::PgPool;

/// Tables the service cannot run without
const REQUIRED_TABLES: &[&str] = &[
    "api_keys",
    "users",
    "ingredients",
    "tags",
    "recipes",
    "recipe_ingredients",
    "recipe_tags",
    "favorites",
    "shopping_cart",
    "follows",
];

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let missing: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT t.name
        FROM unnest($1::text[]) AS t(name)
        WHERE NOT EXISTS (
            SELECT 1 FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name = t.name
        )
        "#,
    )
    .bind(REQUIRED_TABLES)
    .fetch_all(pool)
    .await?;

    for table in &missing {
        tracing::error!("Required table '{}' does not exist", table);
    }

    Ok(missing.is_empty())
}
