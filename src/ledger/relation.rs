//! Relation kinds backed by the ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user association kinds. The left side is always the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// (user, recipe)
    Favorite,
    /// (user, recipe)
    Cart,
    /// (user, followed author)
    Follow,
}

impl RelationKind {
    pub(crate) fn table(&self) -> &'static str {
        match self {
            RelationKind::Favorite => "favorites",
            RelationKind::Cart => "shopping_cart",
            RelationKind::Follow => "follows",
        }
    }

    pub(crate) fn right_column(&self) -> &'static str {
        match self {
            RelationKind::Favorite | RelationKind::Cart => "recipe_id",
            RelationKind::Follow => "following_id",
        }
    }

    /// Foreign key from the left (user) column to `users`, as named by
    /// PostgreSQL for an inline `REFERENCES`
    pub(crate) fn left_foreign_key(&self) -> &'static str {
        match self {
            RelationKind::Favorite => "favorites_user_id_fkey",
            RelationKind::Cart => "shopping_cart_user_id_fkey",
            RelationKind::Follow => "follows_user_id_fkey",
        }
    }

    /// Whether left and right are both user identities
    pub fn is_user_to_user(&self) -> bool {
        matches!(self, RelationKind::Follow)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Favorite => "favorite",
            RelationKind::Cart => "shopping_cart",
            RelationKind::Follow => "follow",
        }
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One stored relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct RelationRecord {
    pub id: i64,
    pub left_id: i64,
    pub right_id: i64,
    pub created_at: DateTime<Utc>,
}
