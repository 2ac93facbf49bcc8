//! Shopping list folding and rendering
//!
//! Pure functions; the aggregator feeds them rows from the store.

use std::collections::HashMap;

use serde::Serialize;

/// Suggested filename for the downloadable list
pub const SHOPPING_LIST_FILENAME: &str = "shopping_cart.txt";

/// One ingredient usage of a recipe in the cart
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CartIngredientRow {
    pub ingredient_id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// One aggregated line of the shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListLine {
    pub ingredient_id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

/// Sum amounts per ingredient. Lines keep the order in which each
/// ingredient is first encountered.
pub fn fold<I>(rows: I) -> Vec<ShoppingListLine>
where
    I: IntoIterator<Item = CartIngredientRow>,
{
    let mut lines: Vec<ShoppingListLine> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for row in rows {
        match index.get(&row.ingredient_id) {
            Some(&position) => {
                lines[position].total_amount += i64::from(row.amount);
            }
            None => {
                index.insert(row.ingredient_id, lines.len());
                lines.push(ShoppingListLine {
                    ingredient_id: row.ingredient_id,
                    name: row.name,
                    measurement_unit: row.measurement_unit,
                    total_amount: i64::from(row.amount),
                });
            }
        }
    }

    lines
}

/// Plain-text rendering, one `name (unit) - total` line each
pub fn render(lines: &[ShoppingListLine]) -> String {
    lines
        .iter()
        .map(|line| {
            format!(
                "{} ({}) - {}\n",
                line.name, line.measurement_unit, line.total_amount
            )
        })
        .collect()
}
