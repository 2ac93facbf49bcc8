//! Catalog Store
//!
//! Read paths for ingredients and tags, plus the seeding write path.

use sqlx::{PgExecutor, PgPool};

use super::{rank_by_name, Ingredient, NewIngredient, NewTag, Tag};

/// Store for catalog reference data
#[derive(Debug, Clone)]
pub struct CatalogStore {
    pool: PgPool,
}

impl CatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Tags
    // =========================================================================

    pub async fn list_tags(&self) -> Result<Vec<Tag>, sqlx::Error> {
        sqlx::query_as("SELECT id, name, color, slug FROM tags ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get_tag(&self, tag_id: i64) -> Result<Option<Tag>, sqlx::Error> {
        sqlx::query_as("SELECT id, name, color, slug FROM tags WHERE id = $1")
            .bind(tag_id)
            .fetch_optional(&self.pool)
            .await
    }

    // =========================================================================
    // Ingredients
    // =========================================================================

    /// List ingredients in catalog order, optionally narrowed and ranked by
    /// a name query
    pub async fn list_ingredients(&self, name: Option<&str>) -> Result<Vec<Ingredient>, sqlx::Error> {
        let query = name.map(str::trim).filter(|q| !q.is_empty());

        let ingredients: Vec<Ingredient> = match query {
            Some(q) => {
                sqlx::query_as(
                    r#"
                    SELECT id, name, measurement_unit
                    FROM ingredients
                    WHERE strpos(name, $1) > 0
                    ORDER BY name, id
                    "#,
                )
                .bind(q)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT id, name, measurement_unit FROM ingredients ORDER BY name, id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(match query {
            Some(q) => rank_by_name(q, ingredients),
            None => ingredients,
        })
    }

    pub async fn get_ingredient(&self, ingredient_id: i64) -> Result<Option<Ingredient>, sqlx::Error> {
        sqlx::query_as("SELECT id, name, measurement_unit FROM ingredients WHERE id = $1")
            .bind(ingredient_id)
            .fetch_optional(&self.pool)
            .await
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Insert ingredients, skipping ones already present. Returns the number
    /// of rows inserted.
    pub async fn seed_ingredients(&self, ingredients: &[NewIngredient]) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for ingredient in ingredients {
            inserted += sqlx::query(
                r#"
                INSERT INTO ingredients (name, measurement_unit)
                VALUES ($1, $2)
                ON CONFLICT (name, measurement_unit) DO NOTHING
                "#,
            )
            .bind(&ingredient.name)
            .bind(&ingredient.measurement_unit)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        tracing::info!(inserted, total = ingredients.len(), "Seeded ingredients");
        Ok(inserted)
    }

    /// Insert tags, skipping any that collide on name, color or slug
    pub async fn seed_tags(&self, tags: &[NewTag]) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for tag in tags {
            inserted += sqlx::query(
                r#"
                INSERT INTO tags (name, color, slug)
                VALUES ($1, $2, $3)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(&tag.name)
            .bind(&tag.color)
            .bind(&tag.slug)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        tracing::info!(inserted, total = tags.len(), "Seeded tags");
        Ok(inserted)
    }
}

// =========================================================================
// Reference checks (usable inside a caller's transaction)
// =========================================================================

/// Return the ingredient ids that do not exist, in submitted order
pub async fn missing_ingredient_ids<'e, E>(executor: E, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        r#"
        SELECT u.id
        FROM unnest($1::bigint[]) WITH ORDINALITY AS u(id, ord)
        WHERE NOT EXISTS (SELECT 1 FROM ingredients i WHERE i.id = u.id)
        ORDER BY u.ord
        "#,
    )
    .bind(ids)
    .fetch_all(executor)
    .await
}

/// Return the tag ids that do not exist, in submitted order
pub async fn missing_tag_ids<'e, E>(executor: E, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        r#"
        SELECT u.id
        FROM unnest($1::bigint[]) WITH ORDINALITY AS u(id, ord)
        WHERE NOT EXISTS (SELECT 1 FROM tags t WHERE t.id = u.id)
        ORDER BY u.ord
        "#,
    )
    .bind(ids)
    .fetch_all(executor)
    .await
}
