//! API Routes
//!
//! HTTP endpoint definitions.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, FromRef, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::aggregate::{IngredientLine, RecipeDraft};
use crate::catalog::{CatalogStore, Ingredient, Tag};
use crate::domain::{DomainError, OperationContext};
use crate::error::{AppError, AppResult};
use crate::filter::RecipeQuery;
use crate::handlers::{
    acting_user, CreateRecipeCommand, CreateRecipeHandler, DeleteRecipeCommand,
    DeleteRecipeHandler, RelationHandler, ShoppingListHandler, UpdateRecipeCommand,
    UpdateRecipeHandler,
};
use crate::media::ImageStore;
use crate::projection::{AuthorView, ProjectionService, RecipeSummary, RecipeView, SubscriptionView};

// =========================================================================
// Application state
// =========================================================================

/// Shared state handed to every route
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub images: Arc<dyn ImageStore>,
    /// Recipe preview size for subscription entries when the caller gives none
    pub subscription_recipes_limit: i64,
}

impl AppState {
    pub fn new(pool: PgPool, images: Arc<dyn ImageStore>, subscription_recipes_limit: i64) -> Self {
        Self {
            pool,
            images,
            subscription_recipes_limit,
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> PgPool {
        state.pool.clone()
    }
}

// =========================================================================
// Request/Response types
// =========================================================================

/// Recipe body for both create and full-replacement update
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeRequest {
    #[serde(default)]
    pub ingredients: Vec<IngredientLine>,
    #[serde(default)]
    pub tags: Vec<i64>,
    /// `data:image/<ext>;base64,<payload>`
    pub image: String,
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
}

impl RecipeRequest {
    fn into_parts(self) -> (RecipeDraft, String) {
        let draft = RecipeDraft {
            name: self.name,
            text: self.text,
            cooking_time: self.cooking_time,
            tag_ids: self.tags,
            ingredients: self.ingredients,
        };
        (draft, self.image)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct IngredientSearchQuery {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionQuery {
    #[serde(default)]
    pub recipes_limit: Option<i64>,
}

/// Unreadable JSON bodies are validation failures, not 422s
fn recipe_body(payload: Result<Json<RecipeRequest>, JsonRejection>) -> AppResult<RecipeRequest> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Domain(DomainError::validation(rejection.body_text())))
}

fn recipes_limit(query: &SubscriptionQuery, default: i64) -> AppResult<i64> {
    match query.recipes_limit {
        Some(limit) if limit < 0 => Err(AppError::Domain(DomainError::validation(
            "recipes_limit must not be negative",
        ))),
        Some(limit) => Ok(limit),
        None => Ok(default),
    }
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/tags", get(list_tags))
        .route("/tags/:tag_id", get(get_tag))
        .route("/ingredients", get(list_ingredients))
        .route("/ingredients/:ingredient_id", get(get_ingredient))
        // Recipes
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route("/recipes/download_shopping_cart", get(download_shopping_cart))
        .route(
            "/recipes/:recipe_id",
            get(get_recipe)
                .patch(update_recipe)
                .put(refuse_put)
                .delete(delete_recipe),
        )
        .route(
            "/recipes/:recipe_id/favorite",
            post(add_favorite).delete(remove_favorite),
        )
        .route(
            "/recipes/:recipe_id/shopping_cart",
            post(add_to_cart).delete(remove_from_cart),
        )
        // Users
        .route("/users/me", get(get_me))
        .route("/users/subscriptions", get(list_subscriptions))
        .route("/users/:user_id", get(get_user))
        .route(
            "/users/:user_id/subscribe",
            post(subscribe).delete(unsubscribe),
        )
}

// =========================================================================
// Catalog
// =========================================================================

async fn list_tags(State(pool): State<PgPool>) -> AppResult<Json<Vec<Tag>>> {
    let tags = CatalogStore::new(pool).list_tags().await?;
    Ok(Json(tags))
}

async fn get_tag(State(pool): State<PgPool>, Path(tag_id): Path<i64>) -> AppResult<Json<Tag>> {
    let tag = CatalogStore::new(pool)
        .get_tag(tag_id)
        .await?
        .ok_or_else(|| AppError::not_found("Tag", tag_id))?;
    Ok(Json(tag))
}

/// `?name=` narrows to names containing the query, prefix matches first
async fn list_ingredients(
    State(pool): State<PgPool>,
    Query(query): Query<IngredientSearchQuery>,
) -> AppResult<Json<Vec<Ingredient>>> {
    let ingredients = CatalogStore::new(pool)
        .list_ingredients(query.name.as_deref())
        .await?;
    Ok(Json(ingredients))
}

async fn get_ingredient(
    State(pool): State<PgPool>,
    Path(ingredient_id): Path<i64>,
) -> AppResult<Json<Ingredient>> {
    let ingredient = CatalogStore::new(pool)
        .get_ingredient(ingredient_id)
        .await?
        .ok_or_else(|| AppError::not_found("Ingredient", ingredient_id))?;
    Ok(Json(ingredient))
}

// =========================================================================
// Recipes
// =========================================================================

/// `author`, repeated `tags`, `is_favorited`, `is_in_shopping_cart`
async fn list_recipes(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Query(params): Query<Vec<(String, String)>>,
) -> AppResult<Json<Vec<RecipeView>>> {
    let filter = RecipeQuery::from_pairs(&params)?.resolve(context.viewer());
    let recipes = ProjectionService::new(pool)
        .list_recipes(&filter, context.viewer())
        .await?;
    Ok(Json(recipes))
}

async fn get_recipe(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(recipe_id): Path<i64>,
) -> AppResult<Json<RecipeView>> {
    let view = ProjectionService::new(pool)
        .get_recipe_view(recipe_id, context.viewer())
        .await?;
    Ok(Json(view))
}

async fn create_recipe(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<RecipeRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RecipeView>)> {
    let (draft, image) = recipe_body(payload)?.into_parts();

    let handler = CreateRecipeHandler::new(state.pool.clone(), state.images.clone());
    let recipe = handler
        .execute(CreateRecipeCommand::new(draft, image), &context)
        .await?;

    let view = ProjectionService::new(state.pool)
        .get_recipe_view(recipe.id, context.viewer())
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Full replacement: every field is required, as on create
async fn update_recipe(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(recipe_id): Path<i64>,
    payload: Result<Json<RecipeRequest>, JsonRejection>,
) -> AppResult<Json<RecipeView>> {
    let (draft, image) = recipe_body(payload)?.into_parts();

    let handler = UpdateRecipeHandler::new(state.pool.clone(), state.images.clone());
    let recipe = handler
        .execute(UpdateRecipeCommand::new(recipe_id, draft, image), &context)
        .await?;

    let view = ProjectionService::new(state.pool)
        .get_recipe_view(recipe.id, context.viewer())
        .await?;
    Ok(Json(view))
}

async fn refuse_put() -> AppError {
    AppError::MethodNotAllowed("PUT".to_string())
}

async fn delete_recipe(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(recipe_id): Path<i64>,
) -> AppResult<StatusCode> {
    DeleteRecipeHandler::new(pool)
        .execute(DeleteRecipeCommand::new(recipe_id), &context)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_favorite(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(recipe_id): Path<i64>,
) -> AppResult<(StatusCode, Json<RecipeSummary>)> {
    let summary = RelationHandler::new(pool).add_favorite(recipe_id, &context).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

async fn remove_favorite(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(recipe_id): Path<i64>,
) -> AppResult<StatusCode> {
    RelationHandler::new(pool).remove_favorite(recipe_id, &context).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_to_cart(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(recipe_id): Path<i64>,
) -> AppResult<(StatusCode, Json<RecipeSummary>)> {
    let summary = RelationHandler::new(pool).add_to_cart(recipe_id, &context).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

async fn remove_from_cart(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(recipe_id): Path<i64>,
) -> AppResult<StatusCode> {
    RelationHandler::new(pool).remove_from_cart(recipe_id, &context).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn download_shopping_cart(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
) -> AppResult<Response> {
    let export = ShoppingListHandler::new(pool).execute(&context).await?;

    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.content,
    )
        .into_response())
}

// =========================================================================
// Users
// =========================================================================

async fn get_me(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
) -> AppResult<Json<AuthorView>> {
    let user_id = acting_user(&context)?;
    let me = ProjectionService::new(pool)
        .get_author(user_id, Some(user_id))
        .await?;
    Ok(Json(me))
}

async fn get_user(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<AuthorView>> {
    let user = ProjectionService::new(pool)
        .get_author(user_id, context.viewer())
        .await?;
    Ok(Json(user))
}

async fn list_subscriptions(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Query(query): Query<SubscriptionQuery>,
) -> AppResult<Json<Vec<SubscriptionView>>> {
    let user_id = acting_user(&context)?;
    let limit = recipes_limit(&query, state.subscription_recipes_limit)?;

    let subscriptions = ProjectionService::new(state.pool)
        .list_subscriptions(user_id, limit)
        .await?;
    Ok(Json(subscriptions))
}

async fn subscribe(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    Path(author_id): Path<i64>,
    Query(query): Query<SubscriptionQuery>,
) -> AppResult<(StatusCode, Json<SubscriptionView>)> {
    let limit = recipes_limit(&query, state.subscription_recipes_limit)?;
    let subscription = RelationHandler::new(state.pool)
        .subscribe(author_id, limit, &context)
        .await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

async fn unsubscribe(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(author_id): Path<i64>,
) -> AppResult<StatusCode> {
    RelationHandler::new(pool).unsubscribe(author_id, &context).await?;
    Ok(StatusCode::NO_CONTENT)
}
