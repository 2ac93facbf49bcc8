//! Command Handlers module
//!
//! Handlers orchestrate one business operation each: validate, touch the
//! store inside a transaction where needed, log the outcome.

mod commands;
mod recipe_handler;
mod relation_handler;
mod shopping_list_handler;


pub use commands::*;
pub use recipe_handler::{CreateRecipeHandler, DeleteRecipeHandler, UpdateRecipeHandler};
pub use relation_handler::RelationHandler;
pub use shopping_list_handler::ShoppingListHandler;

use sqlx::PgExecutor;

use crate::domain::OperationContext;
use crate::error::{AppError, AppResult};

/// Header carrying the already-authenticated end user
pub const REQUEST_USER_HEADER: &str = "X-Request-User-Id";

/// The identity performing a mutation. Anonymous callers are refused.
pub fn acting_user(context: &OperationContext) -> AppResult<i64> {
    context
        .viewer()
        .ok_or_else(|| AppError::AuthenticationRequired(REQUEST_USER_HEADER.to_string()))
}

/// The gateway vouches for the identity, but only a `users` row makes it
/// usable as the left side of a recipe or relation.
pub(crate) async fn ensure_known_user<'e, E>(executor: E, user_id: i64) -> AppResult<()>
where
    E: PgExecutor<'e>,
{
    let known: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(executor)
        .await?;

    if known {
        Ok(())
    } else {
        Err(AppError::not_found("User", user_id))
    }
}
