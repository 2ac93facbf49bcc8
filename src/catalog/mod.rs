//! Catalog module
//!
//! Immutable-identity reference data: ingredients and tags.

mod model;
mod repository;
mod search;

pub use model::{Ingredient, NewIngredient, NewTag, Tag};
pub use repository::{missing_ingredient_ids, missing_tag_ids, CatalogStore};
pub use search::rank_by_name;
