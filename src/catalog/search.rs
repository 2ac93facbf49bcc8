//! Ingredient name search ranking

use super::Ingredient;

/// Rank ingredients for a name query.
///
/// Names that start with the query come first, names that only contain it
/// follow, and names that do not contain it are dropped. Matching is exact
/// on characters (case-sensitive), the same test the SQL pre-filter applies
/// with `strpos`. Within each bucket the input (catalog) order is kept.
pub fn rank_by_name(query: &str, ingredients: Vec<Ingredient>) -> Vec<Ingredient> {
    let needle = query.trim();
    if needle.is_empty() {
        return ingredients;
    }

    let (mut prefixed, contained): (Vec<_>, Vec<_>) = ingredients
        .into_iter()
        .filter(|ingredient| ingredient.name.contains(needle))
        .partition(|ingredient| ingredient.name.starts_with(needle));

    prefixed.extend(contained);
    prefixed
}
