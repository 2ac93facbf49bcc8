//! Projection Service
//!
//! Assembles read models from the recipe tables, the catalog and the
//! relationship ledger. Every viewer-relative flag is computed for an
//! explicit `Option<i64>` viewer; anonymous viewers get `false`.

use std::collections::{HashMap, HashSet};

use sqlx::PgPool;

use crate::aggregate::{Recipe, RecipeStore};
use crate::catalog::Tag;
use crate::error::{AppError, AppResult};
use crate::filter::{FilterEngine, RecipeFilter};
use crate::ledger::{RelationKind, RelationshipLedger};

use super::views::{
    AuthorView, RecipeIngredientView, RecipeSummary, RecipeView, SubscriptionView, UserRow,
};

/// Tag row keyed by the recipe carrying it
#[derive(Debug, sqlx::FromRow)]
struct RecipeTagRow {
    recipe_id: i64,
    #[sqlx(flatten)]
    tag: Tag,
}

/// Ingredient row keyed by the recipe using it
#[derive(Debug, sqlx::FromRow)]
struct RecipeIngredientRow {
    recipe_id: i64,
    #[sqlx(flatten)]
    ingredient: RecipeIngredientView,
}

/// Read-side service
#[derive(Debug, Clone)]
pub struct ProjectionService {
    pool: PgPool,
    recipes: RecipeStore,
    ledger: RelationshipLedger,
    filter: FilterEngine,
}

impl ProjectionService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            recipes: RecipeStore::new(pool.clone()),
            ledger: RelationshipLedger::new(pool.clone()),
            filter: FilterEngine::new(pool.clone()),
            pool,
        }
    }

    // =========================================================================
    // Recipes
    // =========================================================================

    /// One recipe with its compositions and the viewer's flags
    pub async fn get_recipe_view(&self, recipe_id: i64, viewer: Option<i64>) -> AppResult<RecipeView> {
        let recipe = self
            .recipes
            .find(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe", recipe_id))?;

        let mut favorited = HashSet::new();
        if self.ledger.exists(RelationKind::Favorite, viewer, recipe_id).await? {
            favorited.insert(recipe_id);
        }
        let mut in_cart = HashSet::new();
        if self.ledger.exists(RelationKind::Cart, viewer, recipe_id).await? {
            in_cart.insert(recipe_id);
        }
        let author = self.get_author(recipe.author_id, viewer).await?;
        let authors = HashMap::from([(author.id, author)]);

        self.decorate(vec![recipe], &authors, &favorited, &in_cart)
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal(format!("recipe {} vanished while projecting", recipe_id)))
    }

    /// Recipes matching `filter`, newest first, decorated for `viewer`
    pub async fn list_recipes(
        &self,
        filter: &RecipeFilter,
        viewer: Option<i64>,
    ) -> AppResult<Vec<RecipeView>> {
        let recipes = self.filter.matching_recipes(filter).await?;
        if recipes.is_empty() {
            return Ok(Vec::new());
        }

        let recipe_ids: Vec<i64> = recipes.iter().map(|r| r.id).collect();
        let mut author_ids: Vec<i64> = recipes.iter().map(|r| r.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let favorited = self
            .ledger
            .related_among(RelationKind::Favorite, viewer, &recipe_ids)
            .await?;
        let in_cart = self
            .ledger
            .related_among(RelationKind::Cart, viewer, &recipe_ids)
            .await?;
        let authors = self.authors_by_id(&author_ids, viewer).await?;

        self.decorate(recipes, &authors, &favorited, &in_cart).await
    }

    /// Short payload for one recipe
    pub async fn recipe_summary(&self, recipe_id: i64) -> AppResult<RecipeSummary> {
        self.recipes
            .find(recipe_id)
            .await?
            .map(RecipeSummary::from)
            .ok_or_else(|| AppError::not_found("Recipe", recipe_id))
    }

    /// Attach tags, ingredients and authors to each recipe. Tags and
    /// ingredients come from two batched queries.
    async fn decorate(
        &self,
        recipes: Vec<Recipe>,
        authors: &HashMap<i64, AuthorView>,
        favorited: &HashSet<i64>,
        in_cart: &HashSet<i64>,
    ) -> AppResult<Vec<RecipeView>> {
        let recipe_ids: Vec<i64> = recipes.iter().map(|r| r.id).collect();

        let tag_rows = sqlx::query_as::<_, RecipeTagRow>(
            r#"
            SELECT rt.recipe_id, t.id, t.name, t.color, t.slug
            FROM recipe_tags rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = ANY($1)
            ORDER BY t.id
            "#,
        )
        .bind(&recipe_ids)
        .fetch_all(&self.pool)
        .await?;

        let ingredient_rows = sqlx::query_as::<_, RecipeIngredientRow>(
            r#"
            SELECT ri.recipe_id, i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ANY($1)
            ORDER BY ri.id
            "#,
        )
        .bind(&recipe_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in tag_rows {
            tags.entry(row.recipe_id).or_default().push(row.tag);
        }
        let mut ingredients: HashMap<i64, Vec<RecipeIngredientView>> = HashMap::new();
        for row in ingredient_rows {
            ingredients.entry(row.recipe_id).or_default().push(row.ingredient);
        }

        let mut views = Vec::with_capacity(recipes.len());
        for recipe in recipes {
            let author = authors
                .get(&recipe.author_id)
                .cloned()
                .ok_or_else(|| AppError::not_found("User", recipe.author_id))?;

            views.push(RecipeView {
                id: recipe.id,
                tags: tags.remove(&recipe.id).unwrap_or_default(),
                author,
                ingredients: ingredients.remove(&recipe.id).unwrap_or_default(),
                is_favorited: favorited.contains(&recipe.id),
                is_in_shopping_cart: in_cart.contains(&recipe.id),
                name: recipe.name,
                image: recipe.image,
                text: recipe.text,
                cooking_time: recipe.cooking_time,
                pub_date: recipe.pub_date,
            });
        }
        Ok(views)
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub async fn find_user(&self, user_id: i64) -> Result<Option<UserRow>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, email, username, first_name, last_name FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Author profile with `is_subscribed` relative to `viewer`
    pub async fn get_author(&self, user_id: i64, viewer: Option<i64>) -> AppResult<AuthorView> {
        let user = self
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User", user_id))?;
        let is_subscribed = self.ledger.exists(RelationKind::Follow, viewer, user_id).await?;
        Ok(AuthorView::from_row(user, is_subscribed))
    }

    async fn authors_by_id(
        &self,
        user_ids: &[i64],
        viewer: Option<i64>,
    ) -> AppResult<HashMap<i64, AuthorView>> {
        let users: Vec<UserRow> = sqlx::query_as(
            "SELECT id, email, username, first_name, last_name FROM users WHERE id = ANY($1)",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        let followed: HashSet<i64> = self
            .ledger
            .related_among(RelationKind::Follow, viewer, user_ids)
            .await?;

        Ok(users
            .into_iter()
            .map(|user| {
                let is_subscribed = followed.contains(&user.id);
                (user.id, AuthorView::from_row(user, is_subscribed))
            })
            .collect())
    }

    /// One entry for a followed author: profile, newest recipes, total count
    pub async fn subscription(
        &self,
        author_id: i64,
        recipes_limit: i64,
    ) -> AppResult<SubscriptionView> {
        let user = self
            .find_user(author_id)
            .await?
            .ok_or_else(|| AppError::not_found("User", author_id))?;

        let recipes = self
            .recipes
            .by_author(author_id, Some(recipes_limit))
            .await?
            .into_iter()
            .map(RecipeSummary::from)
            .collect();
        let recipes_count = self.recipes.count_by_author(author_id).await?;

        Ok(SubscriptionView {
            author: AuthorView::from_row(user, true),
            recipes,
            recipes_count,
        })
    }

    /// Every author `viewer` follows, in follow order
    pub async fn list_subscriptions(
        &self,
        viewer: i64,
        recipes_limit: i64,
    ) -> AppResult<Vec<SubscriptionView>> {
        let author_ids = self.ledger.list_for(RelationKind::Follow, viewer).await?;

        let mut subscriptions = Vec::with_capacity(author_ids.len());
        for author_id in author_ids {
            subscriptions.push(self.subscription(author_id, recipes_limit).await?);
        }
        Ok(subscriptions)
    }
}
