//! recipe_book Library
//!
//! Recipe sharing backend core: catalog, recipe aggregate, relationship
//! ledger, filter engine and shopping list aggregation.

pub mod aggregate;
pub mod api;
pub mod catalog;
pub mod domain;
pub mod filter;
pub mod handlers;
pub mod ledger;
pub mod media;
pub mod projection;
pub mod shopping;

pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use domain::{Amount, CookingTime, DomainError, OperationContext, QuantityError};
pub use error::{AppError, AppResult, ErrorResponse};
