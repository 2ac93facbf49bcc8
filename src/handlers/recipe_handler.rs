//! Recipe Handlers
//!
//! Create, replace and delete recipes. Each command runs in one
//! transaction: the recipe row and both compositions land together or not
//! at all.

use std::sync::Arc;

use sqlx::{PgPool, Postgres, Transaction};

use crate::aggregate::{Recipe, RecipeContent, RecipeStore};
use crate::catalog::{missing_ingredient_ids, missing_tag_ids};
use crate::domain::{DecodedImage, OperationContext};
use crate::error::{AppError, AppResult};
use crate::media::ImageStore;

use super::{
    acting_user, ensure_known_user, CreateRecipeCommand, DeleteRecipeCommand,
    UpdateRecipeCommand,
};

// =========================================================================
// CreateRecipeHandler
// =========================================================================

/// Handler for recipe creation
pub struct CreateRecipeHandler {
    pool: PgPool,
    images: Arc<dyn ImageStore>,
}

impl CreateRecipeHandler {
    pub fn new(pool: PgPool, images: Arc<dyn ImageStore>) -> Self {
        Self { pool, images }
    }

    /// Execute the create recipe command
    pub async fn execute(
        &self,
        command: CreateRecipeCommand,
        context: &OperationContext,
    ) -> AppResult<Recipe> {
        let author_id = acting_user(context)?;

        let content = command.draft.validate()?;
        let image = command.image.decode()?;

        let mut tx = self.pool.begin().await?;
        ensure_known_user(&mut *tx, author_id).await?;
        ensure_catalog_references(&mut tx, &content).await?;

        let image_key = store_image(self.images.as_ref(), &image).await?;
        let recipe = RecipeStore::insert(&mut tx, author_id, &image_key, &content).await?;

        tx.commit().await?;

        tracing::info!(
            recipe_id = recipe.id,
            author_id,
            ingredients = content.ingredients.len(),
            tags = content.tag_ids.len(),
            correlation_id = ?context.correlation_id,
            "Recipe created"
        );

        Ok(recipe)
    }
}

// =========================================================================
// UpdateRecipeHandler
// =========================================================================

/// Handler for full-replacement recipe updates
pub struct UpdateRecipeHandler {
    pool: PgPool,
    images: Arc<dyn ImageStore>,
}

impl UpdateRecipeHandler {
    pub fn new(pool: PgPool, images: Arc<dyn ImageStore>) -> Self {
        Self { pool, images }
    }

    /// Execute the update recipe command.
    ///
    /// The editor is checked first, then the recipe's existence, then
    /// authorship, then content.
    pub async fn execute(
        &self,
        command: UpdateRecipeCommand,
        context: &OperationContext,
    ) -> AppResult<Recipe> {
        let editor_id = acting_user(context)?;

        let mut tx = self.pool.begin().await?;
        ensure_known_user(&mut *tx, editor_id).await?;
        let current = RecipeStore::find_for_update(&mut tx, command.recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe", command.recipe_id))?;
        current.ensure_editable_by(editor_id)?;

        let content = command.draft.validate()?;
        let image = command.image.decode()?;
        ensure_catalog_references(&mut tx, &content).await?;

        let image_key = store_image(self.images.as_ref(), &image).await?;
        let recipe = RecipeStore::replace(&mut tx, current.id, &image_key, &content).await?;

        tx.commit().await?;

        tracing::info!(
            recipe_id = recipe.id,
            editor_id,
            ingredients = content.ingredients.len(),
            tags = content.tag_ids.len(),
            correlation_id = ?context.correlation_id,
            "Recipe replaced"
        );

        Ok(recipe)
    }
}

// =========================================================================
// DeleteRecipeHandler
// =========================================================================

/// Handler for recipe deletion
pub struct DeleteRecipeHandler {
    pool: PgPool,
}

impl DeleteRecipeHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete the recipe; its edges, favorites and cart entries cascade
    pub async fn execute(
        &self,
        command: DeleteRecipeCommand,
        context: &OperationContext,
    ) -> AppResult<()> {
        let editor_id = acting_user(context)?;

        let mut tx = self.pool.begin().await?;
        ensure_known_user(&mut *tx, editor_id).await?;
        let recipe = RecipeStore::find_for_update(&mut tx, command.recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe", command.recipe_id))?;
        recipe.ensure_editable_by(editor_id)?;

        RecipeStore::delete(&mut tx, recipe.id).await?;
        tx.commit().await?;

        tracing::info!(
            recipe_id = recipe.id,
            editor_id,
            correlation_id = ?context.correlation_id,
            "Recipe deleted"
        );

        Ok(())
    }
}

// =========================================================================
// Shared steps
// =========================================================================

/// Every referenced ingredient and tag must exist. The first unknown
/// ingredient (in submitted order) is reported, then the first unknown tag.
async fn ensure_catalog_references(
    tx: &mut Transaction<'_, Postgres>,
    content: &RecipeContent,
) -> AppResult<()> {
    let missing = missing_ingredient_ids(&mut **tx, &content.ingredient_ids()).await?;
    if let Some(id) = missing.first() {
        return Err(AppError::not_found("Ingredient", id));
    }

    if !content.tag_ids.is_empty() {
        let missing = missing_tag_ids(&mut **tx, &content.tag_ids).await?;
        if let Some(id) = missing.first() {
            return Err(AppError::not_found("Tag", id));
        }
    }

    Ok(())
}

/// Image keys are content-addressed, so an image stored by a transaction
/// that later rolls back is simply reused by the next identical upload.
async fn store_image(images: &dyn ImageStore, image: &DecodedImage) -> AppResult<String> {
    let key = images.put(image).await?;
    Ok(key)
}
