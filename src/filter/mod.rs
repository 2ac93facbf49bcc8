//! Filter Engine module
//!
//! Query parameters -> typed predicates -> parameterized SQL.

mod compile;
mod engine;
mod spec;

pub use engine::FilterEngine;
pub use spec::{AuthorFilter, Predicate, RecipeFilter, RecipeQuery, AUTHOR_ME};
