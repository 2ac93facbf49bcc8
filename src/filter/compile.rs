//! Predicate to SQL compilation
//!
//! Every value is bound, never interpolated. Predicates render as
//! `AND ...` fragments appended after a `WHERE TRUE` head.

use sqlx::{Postgres, QueryBuilder};

use super::{Predicate, RecipeFilter};

/// Columns selected for a recipe row; `r` is the recipes alias
pub(crate) const RECIPE_COLUMNS: &str =
    "r.id, r.author_id, r.name, r.image, r.text, r.cooking_time, r.pub_date";

/// Start a recipe listing query ready to receive predicates
pub(crate) fn recipe_select() -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT ");
    builder.push(RECIPE_COLUMNS);
    builder.push(" FROM recipes r WHERE TRUE");
    builder
}

impl RecipeFilter {
    /// Append this filter's conditions to a query whose recipes alias is `r`
    pub fn push_predicates(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        for predicate in &self.predicates {
            predicate.push_sql(builder);
        }
    }
}

impl Predicate {
    fn push_sql(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Predicate::Author(Some(author_id)) => {
                builder.push(" AND r.author_id = ").push_bind(*author_id);
            }
            Predicate::AnyTag(slugs) => {
                builder
                    .push(
                        " AND EXISTS (SELECT 1 FROM recipe_tags rt \
                         JOIN tags t ON t.id = rt.tag_id \
                         WHERE rt.recipe_id = r.id AND t.slug = ANY(",
                    )
                    .push_bind(slugs.clone())
                    .push("))");
            }
            Predicate::FavoritedBy(Some(user_id)) => {
                builder
                    .push(" AND EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
                    .push_bind(*user_id)
                    .push(")");
            }
            Predicate::InCartOf(Some(user_id)) => {
                builder
                    .push(" AND EXISTS (SELECT 1 FROM shopping_cart c WHERE c.recipe_id = r.id AND c.user_id = ")
                    .push_bind(*user_id)
                    .push(")");
            }
            Predicate::Author(None) | Predicate::FavoritedBy(None) | Predicate::InCartOf(None) => {
                builder.push(" AND FALSE");
            }
        }
    }
}
