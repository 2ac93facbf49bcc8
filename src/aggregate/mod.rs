//! Aggregate module
//!
//! Consistency boundaries and their invariants.

pub mod recipe;
mod store;

pub use recipe::{
    IngredientLine, Recipe, RecipeContent, RecipeDraft, RecipeIngredientEdge, MAX_NAME_LEN,
};
pub use store::RecipeStore;
