//! Ledger Errors

use crate::domain::DomainError;
use crate::error::AppError;

use super::RelationKind;

/// Errors that can occur in the relationship ledger
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The pair already exists (including a lost insert race)
    #[error("{kind} ({left}, {right}) already exists")]
    AlreadyExists { kind: RelationKind, left: i64, right: i64 },

    /// No such pair to remove
    #[error("{kind} ({left}, {right}) does not exist")]
    Missing { kind: RelationKind, left: i64, right: i64 },

    /// The recipe or followed user vanished before the insert landed
    #[error("{kind} target {right} does not exist")]
    DanglingReference { kind: RelationKind, right: i64 },

    /// The acting user has no `users` row
    #[error("user {0} does not exist")]
    UnknownUser(i64),

    /// A user tried to relate to themself
    #[error("user {0} cannot follow themself")]
    SelfRelation(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl LedgerError {
    /// Attribute a foreign key violation to the side of the pair whose
    /// constraint fired
    pub(crate) fn foreign_key(kind: RelationKind, constraint: Option<&str>, left: i64, right: i64) -> Self {
        if constraint == Some(kind.left_foreign_key()) {
            LedgerError::UnknownUser(left)
        } else {
            LedgerError::DanglingReference { kind, right }
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AlreadyExists { .. } => {
                AppError::Domain(DomainError::Conflict(err.to_string()))
            }
            LedgerError::Missing { kind, left, right } => AppError::Domain(DomainError::NotFound {
                entity: match kind {
                    RelationKind::Favorite => "Favorite",
                    RelationKind::Cart => "Shopping cart entry",
                    RelationKind::Follow => "Subscription",
                },
                id: format!("({}, {})", left, right),
            }),
            LedgerError::DanglingReference { kind, right } => {
                let entity = if kind.is_user_to_user() { "User" } else { "Recipe" };
                AppError::not_found(entity, right)
            }
            LedgerError::UnknownUser(user_id) => AppError::not_found("User", user_id),
            LedgerError::SelfRelation(_) => {
                AppError::Domain(DomainError::InvalidOperation(err.to_string()))
            }
            LedgerError::Database(e) => AppError::Database(e),
        }
    }
}
