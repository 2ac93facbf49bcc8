//! Relation Handler
//!
//! Favorite, shopping cart and subscription toggles for the acting user.
//! The acting user and then the target are checked first, so a missing
//! identity is reported as such rather than as a missing relation.

use sqlx::PgPool;

use crate::aggregate::RecipeStore;
use crate::domain::OperationContext;
use crate::error::{AppError, AppResult};
use crate::ledger::{RelationKind, RelationshipLedger};
use crate::projection::{ProjectionService, RecipeSummary, SubscriptionView};

use super::{acting_user, ensure_known_user};

/// Handler for per-user relations
pub struct RelationHandler {
    pool: PgPool,
    ledger: RelationshipLedger,
    recipes: RecipeStore,
    projection: ProjectionService,
}

impl RelationHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            ledger: RelationshipLedger::new(pool.clone()),
            recipes: RecipeStore::new(pool.clone()),
            projection: ProjectionService::new(pool.clone()),
            pool,
        }
    }

    // =========================================================================
    // Recipe relations
    // =========================================================================

    pub async fn add_favorite(
        &self,
        recipe_id: i64,
        context: &OperationContext,
    ) -> AppResult<RecipeSummary> {
        self.add_recipe_relation(RelationKind::Favorite, recipe_id, context).await
    }

    pub async fn remove_favorite(&self, recipe_id: i64, context: &OperationContext) -> AppResult<()> {
        self.remove_recipe_relation(RelationKind::Favorite, recipe_id, context).await
    }

    pub async fn add_to_cart(
        &self,
        recipe_id: i64,
        context: &OperationContext,
    ) -> AppResult<RecipeSummary> {
        self.add_recipe_relation(RelationKind::Cart, recipe_id, context).await
    }

    pub async fn remove_from_cart(&self, recipe_id: i64, context: &OperationContext) -> AppResult<()> {
        self.remove_recipe_relation(RelationKind::Cart, recipe_id, context).await
    }

    async fn add_recipe_relation(
        &self,
        kind: RelationKind,
        recipe_id: i64,
        context: &OperationContext,
    ) -> AppResult<RecipeSummary> {
        let user_id = self.known_acting_user(context).await?;
        let summary = self.projection.recipe_summary(recipe_id).await?;

        self.ledger.add(kind, user_id, recipe_id).await?;
        Ok(summary)
    }

    async fn remove_recipe_relation(
        &self,
        kind: RelationKind,
        recipe_id: i64,
        context: &OperationContext,
    ) -> AppResult<()> {
        let user_id = self.known_acting_user(context).await?;
        if !self.recipes.exists(recipe_id).await? {
            return Err(AppError::not_found("Recipe", recipe_id));
        }

        self.ledger.remove(kind, user_id, recipe_id).await?;
        Ok(())
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Follow `author_id` and return the new subscription entry
    pub async fn subscribe(
        &self,
        author_id: i64,
        recipes_limit: i64,
        context: &OperationContext,
    ) -> AppResult<SubscriptionView> {
        let user_id = self.known_acting_user(context).await?;
        ensure_known_user(&self.pool, author_id).await?;

        self.ledger.add(RelationKind::Follow, user_id, author_id).await?;
        self.projection.subscription(author_id, recipes_limit).await
    }

    pub async fn unsubscribe(&self, author_id: i64, context: &OperationContext) -> AppResult<()> {
        let user_id = self.known_acting_user(context).await?;
        ensure_known_user(&self.pool, author_id).await?;

        self.ledger.remove(RelationKind::Follow, user_id, author_id).await?;
        Ok(())
    }

    async fn known_acting_user(&self, context: &OperationContext) -> AppResult<i64> {
        let user_id = acting_user(context)?;
        ensure_known_user(&self.pool, user_id).await?;
        Ok(user_id)
    }
}
