//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Domain-specific errors
///
/// The caller-visible failure taxonomy. Each variant carries enough context
/// for the boundary to render a machine-readable kind and a human message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input: duplicate ingredient lines, non-positive amounts or
    /// cooking time, empty compositions
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        ingredient_id: Option<i64>,
    },

    /// A referenced ingredient, tag, recipe or user does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Duplicate relationship or unique constraint violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Operation that is never allowed (self-follow, refused verb)
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Acting user is not allowed to mutate the target
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl DomainError {
    /// Create a validation error that is not tied to one ingredient
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            ingredient_id: None,
        }
    }

    /// Create a validation error naming the offending ingredient
    pub fn invalid_ingredient(ingredient_id: i64, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            ingredient_id: Some(ingredient_id),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Machine-readable kind, stable across message wording changes
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::Conflict(_) => "conflict",
            Self::InvalidOperation(_) => "invalid_operation",
            Self::Forbidden(_) => "forbidden",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_ingredient_carries_id() {
        let err = DomainError::invalid_ingredient(7, "Ingredient is already in the list");

        assert_eq!(err.kind(), "validation_error");
        match err {
            DomainError::Validation { ingredient_id, .. } => assert_eq!(ingredient_id, Some(7)),
            other => panic!("Expected Validation, got: {:?}", other),
        }
    }

    #[test]
    fn test_not_found_message() {
        let err = DomainError::not_found("Ingredient", 42);
        assert_eq!(err.to_string(), "Ingredient not found: 42");
        assert_eq!(err.kind(), "not_found");
    }
}
