//! Recipe Aggregate
//!
//! A recipe together with its ingredient-quantity edges and tag edges. The
//! aggregate owns both compositions: they are written, replaced and deleted
//! only as a whole with the recipe.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Amount, CookingTime, DomainError};

/// Longest accepted recipe name
pub const MAX_NAME_LEN: usize = 200;

/// Persisted recipe row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    pub id: i64,
    pub author_id: i64,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    /// Assigned once on insert, never updated
    pub pub_date: DateTime<Utc>,
}

impl Recipe {
    /// Only the author may change or delete a recipe
    pub fn ensure_editable_by(&self, editor_id: i64) -> Result<(), DomainError> {
        if self.author_id == editor_id {
            Ok(())
        } else {
            Err(DomainError::Forbidden(format!(
                "user {} is not the author of recipe {}",
                editor_id, self.id
            )))
        }
    }
}

/// One (recipe, ingredient) edge with its quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecipeIngredientEdge {
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub amount: i32,
}

/// Ingredient line as submitted, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientLine {
    #[serde(rename = "id")]
    pub ingredient_id: i64,
    pub amount: i64,
}

impl IngredientLine {
    pub fn new(ingredient_id: i64, amount: i64) -> Self {
        Self {
            ingredient_id,
            amount,
        }
    }
}

/// Unvalidated recipe content, shared by create and full-replacement update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
    pub tag_ids: Vec<i64>,
    pub ingredients: Vec<IngredientLine>,
}

/// Recipe content that satisfies every aggregate invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeContent {
    pub name: String,
    pub text: String,
    pub cooking_time: CookingTime,
    /// Distinct tag ids in submitted order
    pub tag_ids: Vec<i64>,
    /// Distinct ingredients in submitted order
    pub ingredients: Vec<(i64, Amount)>,
}

impl RecipeContent {
    pub fn ingredient_ids(&self) -> Vec<i64> {
        self.ingredients.iter().map(|(id, _)| *id).collect()
    }
}

impl RecipeDraft {
    /// Check the aggregate invariants.
    ///
    /// Ingredient lines are checked in submitted order; the first duplicate
    /// or the first amount below 1 fails, naming that ingredient. Catalog
    /// existence is checked by the caller inside its transaction.
    pub fn validate(self) -> Result<RecipeContent, DomainError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("Recipe name must not be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation(format!(
                "Recipe name must be at most {} characters",
                MAX_NAME_LEN
            )));
        }

        if self.text.trim().is_empty() {
            return Err(DomainError::validation("Recipe description must not be empty"));
        }

        let cooking_time = CookingTime::new(self.cooking_time)
            .map_err(|e| DomainError::validation(format!("Invalid cooking time: {}", e)))?;

        if self.ingredients.is_empty() {
            return Err(DomainError::validation(
                "A recipe needs at least one ingredient",
            ));
        }

        let mut seen = HashSet::with_capacity(self.ingredients.len());
        let mut ingredients = Vec::with_capacity(self.ingredients.len());
        for line in self.ingredients {
            if !seen.insert(line.ingredient_id) {
                return Err(DomainError::invalid_ingredient(
                    line.ingredient_id,
                    "Ingredient is already in the list",
                ));
            }
            let amount = Amount::new(line.amount).map_err(|_| {
                DomainError::invalid_ingredient(
                    line.ingredient_id,
                    "Ingredient amount must be 1 or more",
                )
            })?;
            ingredients.push((line.ingredient_id, amount));
        }

        let mut seen_tags = HashSet::with_capacity(self.tag_ids.len());
        let tag_ids = self
            .tag_ids
            .into_iter()
            .filter(|id| seen_tags.insert(*id))
            .collect();

        Ok(RecipeContent {
            name,
            text: self.text,
            cooking_time,
            tag_ids,
            ingredients,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(ingredients: Vec<IngredientLine>) -> RecipeDraft {
        RecipeDraft {
            name: "Pancakes".to_string(),
            text: "Mix and fry".to_string(),
            cooking_time: 20,
            tag_ids: vec![1, 2, 1],
            ingredients,
        }
    }

    fn validation_ingredient(err: DomainError) -> Option<i64> {
        match err {
            DomainError::Validation { ingredient_id, .. } => ingredient_id,
            other => panic!("Expected Validation, got: {:?}", other),
        }
    }

    #[test]
    fn test_valid_draft_keeps_one_edge_per_ingredient() {
        let content = draft(vec![IngredientLine::new(10, 200), IngredientLine::new(11, 3)])
            .validate()
            .unwrap();

        assert_eq!(content.ingredient_ids(), vec![10, 11]);
        assert_eq!(content.ingredients[0].1.value(), 200);
        assert_eq!(content.ingredients[1].1.value(), 3);
        assert_eq!(content.tag_ids, vec![1, 2]);
        assert_eq!(content.cooking_time.minutes(), 20);
    }

    #[test]
    fn test_duplicate_ingredient_rejected() {
        let err = draft(vec![
            IngredientLine::new(10, 200),
            IngredientLine::new(11, 1),
            IngredientLine::new(10, 50),
        ])
        .validate()
        .unwrap_err();

        assert_eq!(validation_ingredient(err), Some(10));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let err = draft(vec![IngredientLine::new(10, 0)]).validate().unwrap_err();
        assert_eq!(validation_ingredient(err), Some(10));
    }

    #[test]
    fn test_first_failing_line_is_reported() {
        let err = draft(vec![
            IngredientLine::new(5, -1),
            IngredientLine::new(6, 1),
            IngredientLine::new(6, 1),
        ])
        .validate()
        .unwrap_err();
        assert_eq!(validation_ingredient(err), Some(5));
    }

    #[test]
    fn test_empty_ingredients_rejected() {
        let err = draft(vec![]).validate().unwrap_err();
        assert_eq!(validation_ingredient(err), None);
    }

    #[test]
    fn test_cooking_time_below_one_rejected() {
        let mut d = draft(vec![IngredientLine::new(1, 1)]);
        d.cooking_time = 0;
        assert_eq!(d.validate().unwrap_err().kind(), "validation_error");
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut d = draft(vec![IngredientLine::new(1, 1)]);
        d.name = "   ".to_string();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_ingredient_line_wire_format() {
        let line: IngredientLine = serde_json::from_str(r#"{"id": 4, "amount": 10}"#).unwrap();
        assert_eq!(line, IngredientLine::new(4, 10));
    }

    #[test]
    fn test_only_author_may_edit() {
        let recipe = Recipe {
            id: 1,
            author_id: 42,
            name: "Soup".to_string(),
            image: "recipes/images/x.png".to_string(),
            text: "Boil".to_string(),
            cooking_time: 30,
            pub_date: Utc::now(),
        };

        assert!(recipe.ensure_editable_by(42).is_ok());
        assert!(matches!(
            recipe.ensure_editable_by(7),
            Err(DomainError::Forbidden(_))
        ));
    }
}
