//! Shopping List Aggregator module

mod aggregator;
mod list;

pub use aggregator::ShoppingListAggregator;
pub use list::{fold, render, CartIngredientRow, ShoppingListLine, SHOPPING_LIST_FILENAME};
