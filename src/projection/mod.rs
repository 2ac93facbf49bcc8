//! Projection module
//!
//! Read models: recipe views with viewer flags, author profiles and
//! subscription listings.

mod service;
mod views;

pub use service::ProjectionService;
pub use views::{
    AuthorView, RecipeIngredientView, RecipeSummary, RecipeView, SubscriptionView, UserRow,
};
