//! Filter Engine
//!
//! Runs a resolved `RecipeFilter` against the recipe table.

use sqlx::PgPool;

use crate::aggregate::Recipe;

use super::compile::recipe_select;
use super::RecipeFilter;

#[derive(Debug, Clone)]
pub struct FilterEngine {
    pool: PgPool,
}

impl FilterEngine {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Recipes satisfying every predicate, newest first
    pub async fn matching_recipes(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>, sqlx::Error> {
        let mut builder = recipe_select();
        filter.push_predicates(&mut builder);
        builder.push(" ORDER BY r.pub_date DESC, r.id DESC");

        let recipes = builder.build_query_as::<Recipe>().fetch_all(&self.pool).await?;

        tracing::debug!(
            predicates = filter.predicates.len(),
            matched = recipes.len(),
            "Recipe filter evaluated"
        );
        Ok(recipes)
    }
}
