//! Shopping List Aggregator
//!
//! Reads the user's cart through the ledger, then every ingredient edge of
//! those recipes in a single query, and folds them.

use sqlx::PgPool;

use crate::error::AppResult;
use crate::ledger::{RelationKind, RelationshipLedger};

use super::list::{fold, CartIngredientRow, ShoppingListLine};

#[derive(Debug, Clone)]
pub struct ShoppingListAggregator {
    pool: PgPool,
    ledger: RelationshipLedger,
}

impl ShoppingListAggregator {
    pub fn new(pool: PgPool) -> Self {
        let ledger = RelationshipLedger::new(pool.clone());
        Self { pool, ledger }
    }

    /// Aggregated list for `user_id`. Recipes deleted after being carted
    /// are gone from the cart by cascade, so they contribute nothing.
    pub async fn build(&self, user_id: i64) -> AppResult<Vec<ShoppingListLine>> {
        let recipe_ids = self.ledger.list_for(RelationKind::Cart, user_id).await?;
        if recipe_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, CartIngredientRow>(
            r#"
            SELECT ri.ingredient_id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ANY($1)
            ORDER BY array_position($1::bigint[], ri.recipe_id), ri.id
            "#,
        )
        .bind(&recipe_ids)
        .fetch_all(&self.pool)
        .await?;

        let lines = fold(rows);

        tracing::info!(
            user_id,
            recipes = recipe_ids.len(),
            lines = lines.len(),
            "Shopping list built"
        );
        Ok(lines)
    }
}
