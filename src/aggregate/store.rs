//! Recipe Store
//!
//! Persistence for the recipe aggregate. Writes take the caller's
//! transaction so the recipe row and both compositions commit together.

use sqlx::{PgPool, Postgres, Transaction};

use super::{Recipe, RecipeContent, RecipeIngredientEdge};

const RECIPE_COLUMNS: &str = "id, author_id, name, image, text, cooking_time, pub_date";

#[derive(Debug, Clone)]
pub struct RecipeStore {
    pool: PgPool,
}

impl RecipeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn find(&self, recipe_id: i64) -> Result<Option<Recipe>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {} FROM recipes WHERE id = $1", RECIPE_COLUMNS))
            .bind(recipe_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn exists(&self, recipe_id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM recipes WHERE id = $1)")
            .bind(recipe_id)
            .fetch_one(&self.pool)
            .await
    }

    /// Ingredient edges of a recipe in insertion order
    pub async fn edges(&self, recipe_id: i64) -> Result<Vec<RecipeIngredientEdge>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT recipe_id, ingredient_id, amount
            FROM recipe_ingredients
            WHERE recipe_id = $1
            ORDER BY id
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Recipes by one author, newest first, at most `limit` when given
    pub async fn by_author(
        &self,
        author_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Recipe>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {} FROM recipes WHERE author_id = $1 \
             ORDER BY pub_date DESC, id DESC LIMIT $2",
            RECIPE_COLUMNS
        ))
        .bind(author_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_by_author(&self, author_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
    }

    // =========================================================================
    // Writes (inside the caller's transaction)
    // =========================================================================

    /// Lock a recipe row for the rest of the transaction
    pub async fn find_for_update(
        tx: &mut Transaction<'_, Postgres>,
        recipe_id: i64,
    ) -> Result<Option<Recipe>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {} FROM recipes WHERE id = $1 FOR UPDATE",
            RECIPE_COLUMNS
        ))
        .bind(recipe_id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Insert the recipe row and its compositions
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        author_id: i64,
        image: &str,
        content: &RecipeContent,
    ) -> Result<Recipe, sqlx::Error> {
        let recipe: Recipe = sqlx::query_as(&format!(
            r#"
            INSERT INTO recipes (author_id, name, image, text, cooking_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            RECIPE_COLUMNS
        ))
        .bind(author_id)
        .bind(&content.name)
        .bind(image)
        .bind(&content.text)
        .bind(content.cooking_time.minutes())
        .fetch_one(&mut **tx)
        .await?;

        Self::insert_compositions(tx, recipe.id, content).await?;
        Ok(recipe)
    }

    /// Overwrite every scalar field and both compositions. `pub_date` and
    /// the author stay as they were.
    pub async fn replace(
        tx: &mut Transaction<'_, Postgres>,
        recipe_id: i64,
        image: &str,
        content: &RecipeContent,
    ) -> Result<Recipe, sqlx::Error> {
        let recipe: Recipe = sqlx::query_as(&format!(
            r#"
            UPDATE recipes
            SET name = $2, image = $3, text = $4, cooking_time = $5
            WHERE id = $1
            RETURNING {}
            "#,
            RECIPE_COLUMNS
        ))
        .bind(recipe_id)
        .bind(&content.name)
        .bind(image)
        .bind(&content.text)
        .bind(content.cooking_time.minutes())
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut **tx)
            .await?;
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut **tx)
            .await?;

        Self::insert_compositions(tx, recipe_id, content).await?;
        Ok(recipe)
    }

    /// Delete a recipe; edges and ledger rows go with it by cascade.
    /// Returns whether a row was removed.
    pub async fn delete(
        tx: &mut Transaction<'_, Postgres>,
        recipe_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let rows = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .execute(&mut **tx)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }

    async fn insert_compositions(
        tx: &mut Transaction<'_, Postgres>,
        recipe_id: i64,
        content: &RecipeContent,
    ) -> Result<(), sqlx::Error> {
        let (ingredient_ids, amounts): (Vec<i64>, Vec<i32>) = content
            .ingredients
            .iter()
            .map(|(id, amount)| (*id, amount.value()))
            .unzip();

        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
            SELECT $1, u.ingredient_id, u.amount
            FROM unnest($2::bigint[], $3::int[]) WITH ORDINALITY AS u(ingredient_id, amount, ord)
            ORDER BY u.ord
            "#,
        )
        .bind(recipe_id)
        .bind(&ingredient_ids)
        .bind(&amounts)
        .execute(&mut **tx)
        .await?;

        if !content.tag_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO recipe_tags (recipe_id, tag_id)
                SELECT $1, unnest($2::bigint[])
                "#,
            )
            .bind(recipe_id)
            .bind(&content.tag_ids)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}
