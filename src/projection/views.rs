//! Read models returned to callers

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::Recipe;
use crate::catalog::Tag;

/// Stored user profile. Accounts are managed elsewhere; this service only
/// reads them.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Author summary, relative to a viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorView {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl AuthorView {
    pub fn from_row(user: UserRow, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

/// Ingredient edge joined with its catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct RecipeIngredientView {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Full recipe payload with viewer-relative flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeView {
    pub id: i64,
    pub tags: Vec<Tag>,
    pub author: AuthorView,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub pub_date: DateTime<Utc>,
}

/// Short recipe payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<Recipe> for RecipeSummary {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// A followed author with a preview of their newest recipes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub author: AuthorView,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_flattens_author() {
        let view = SubscriptionView {
            author: AuthorView {
                id: 2,
                email: "cook@example.com".to_string(),
                username: "cook".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Baker".to_string(),
                is_subscribed: true,
            },
            recipes: vec![],
            recipes_count: 0,
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["username"], "cook");
        assert_eq!(json["is_subscribed"], true);
        assert_eq!(json["recipes_count"], 0);
        assert!(json.get("author").is_none());
    }
}
