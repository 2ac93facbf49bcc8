//! Shopping List Handler

use sqlx::PgPool;

use crate::domain::OperationContext;
use crate::error::AppResult;
use crate::shopping::ShoppingListAggregator;

use super::{acting_user, ensure_known_user, ShoppingListExport};

/// Handler for the shopping list download
pub struct ShoppingListHandler {
    pool: PgPool,
    aggregator: ShoppingListAggregator,
}

impl ShoppingListHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            aggregator: ShoppingListAggregator::new(pool.clone()),
            pool,
        }
    }

    /// Build and render the acting user's shopping list. An empty cart
    /// yields an empty document.
    pub async fn execute(&self, context: &OperationContext) -> AppResult<ShoppingListExport> {
        let user_id = acting_user(context)?;
        ensure_known_user(&self.pool, user_id).await?;
        let lines = self.aggregator.build(user_id).await?;
        Ok(ShoppingListExport::new(lines))
    }
}
