//! Command definitions
//!
//! Commands represent intentions to change the system state.

use serde::Serialize;

use crate::aggregate::RecipeDraft;
use crate::domain::ImageInput;
use crate::shopping::{ShoppingListLine, SHOPPING_LIST_FILENAME};

// =========================================================================
// Recipe commands
// =========================================================================

/// Command to publish a new recipe as the acting user
#[derive(Debug, Clone)]
pub struct CreateRecipeCommand {
    pub draft: RecipeDraft,
    pub image: ImageInput,
}

impl CreateRecipeCommand {
    pub fn new(draft: RecipeDraft, image: impl Into<ImageInput>) -> Self {
        Self {
            draft,
            image: image.into(),
        }
    }
}

/// Command to replace every field and both compositions of a recipe
#[derive(Debug, Clone)]
pub struct UpdateRecipeCommand {
    pub recipe_id: i64,
    pub draft: RecipeDraft,
    pub image: ImageInput,
}

impl UpdateRecipeCommand {
    pub fn new(recipe_id: i64, draft: RecipeDraft, image: impl Into<ImageInput>) -> Self {
        Self {
            recipe_id,
            draft,
            image: image.into(),
        }
    }
}

/// Command to delete a recipe
#[derive(Debug, Clone, Copy)]
pub struct DeleteRecipeCommand {
    pub recipe_id: i64,
}

impl DeleteRecipeCommand {
    pub fn new(recipe_id: i64) -> Self {
        Self { recipe_id }
    }
}

// =========================================================================
// Shopping list export
// =========================================================================

/// Rendered shopping list, ready to be served as a download
#[derive(Debug, Clone, Serialize)]
pub struct ShoppingListExport {
    pub filename: &'static str,
    pub lines: Vec<ShoppingListLine>,
    pub content: String,
}

impl ShoppingListExport {
    pub fn new(lines: Vec<ShoppingListLine>) -> Self {
        let content = crate::shopping::render(&lines);
        Self {
            filename: SHOPPING_LIST_FILENAME,
            lines,
            content,
        }
    }
}
