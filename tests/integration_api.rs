//! API Integration Tests

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    middleware, Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::util::ServiceExt;

use recipe_book::api::{self, AppState};

mod common;

fn app(pool: &PgPool, images: std::sync::Arc<dyn recipe_book::media::ImageStore>) -> Router {
    api::create_router()
        .layer(middleware::from_fn_with_state(
            pool.clone(),
            recipe_book::api::middleware::auth_middleware,
        ))
        .with_state(AppState::new(pool.clone(), images, 3))
}

fn request(method: &str, uri: &str, user: Option<i64>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-API-Key", common::API_KEY);
    if let Some(user_id) = user {
        builder = builder.header("X-Request-User-Id", user_id.to_string());
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, req).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_recipe_lifecycle_e2e() {
    let Some(pool) = common::setup_test_db().await else { return };
    let (_dir, images) = common::image_store();
    let app = app(&pool, images);

    let author = common::create_user(&pool, "api_author").await;
    let shopper = common::create_user(&pool, "api_shopper").await;
    let flour_name = common::unique("flour");
    let flour = common::create_ingredient(&pool, &flour_name, "g").await;
    let (tag, slug) = common::create_tag(&pool, "api_tag").await;

    // 1. Create recipe
    let body = json!({
        "ingredients": [{"id": flour, "amount": 250}],
        "tags": [tag],
        "image": common::png_data_uri(b"api-image"),
        "name": "Flatbread",
        "text": "Knead and bake.",
        "cooking_time": 30
    });
    let (status, created) = send_json(&app, request("POST", "/recipes", Some(author), Some(body.clone()))).await;
    assert_eq!(status, StatusCode::CREATED, "Recipe creation failed: {}", created);
    let recipe_id = created["id"].as_i64().unwrap();
    assert_eq!(created["author"]["id"], author);
    assert_eq!(created["ingredients"][0]["amount"], 250);
    assert_eq!(created["tags"][0]["slug"], slug.as_str());
    assert_eq!(created["is_favorited"], false);

    // 2. Anonymous create is refused
    let (status, error) = send_json(&app, request("POST", "/recipes", None, Some(body))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error["error_code"], "authentication_required");

    // 3. Favorite and cart
    let uri = format!("/recipes/{}/favorite", recipe_id);
    let (status, summary) = send_json(&app, request("POST", &uri, Some(shopper), None)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(summary["name"], "Flatbread");

    let (status, error) = send_json(&app, request("POST", &uri, Some(shopper), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error_code"], "conflict");

    let cart_uri = format!("/recipes/{}/shopping_cart", recipe_id);
    let (status, _) = send_json(&app, request("POST", &cart_uri, Some(shopper), None)).await;
    assert_eq!(status, StatusCode::CREATED);

    // 4. Viewer flags
    let (status, view) = send_json(
        &app,
        request("GET", &format!("/recipes/{}", recipe_id), Some(shopper), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["is_favorited"], true);
    assert_eq!(view["is_in_shopping_cart"], true);

    // 5. Filtered listing
    let (status, list) = send_json(
        &app,
        request(
            "GET",
            &format!("/recipes?tags={}&is_favorited=1", slug),
            Some(shopper),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    // 6. Shopping list download
    let response = app
        .clone()
        .oneshot(request("GET", "/recipes/download_shopping_cart", Some(shopper), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"shopping_cart.txt\""
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(
        String::from_utf8(body.to_vec()).unwrap(),
        format!("{} (g) - 250\n", flour_name)
    );

    // 7. Remove favorite twice: second is not found
    let (status, _) = send(&app, request("DELETE", &uri, Some(shopper), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, error) = send_json(&app, request("DELETE", &uri, Some(shopper), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error_code"], "not_found");

    // 8. Delete by non-author is forbidden, by author succeeds
    let recipe_uri = format!("/recipes/{}", recipe_id);
    let (status, _) = send(&app, request("DELETE", &recipe_uri, Some(shopper), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, request("DELETE", &recipe_uri, Some(author), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, request("GET", &recipe_uri, None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validation_errors_name_the_ingredient() {
    let Some(pool) = common::setup_test_db().await else { return };
    let (_dir, images) = common::image_store();
    let app = app(&pool, images);

    let author = common::create_user(&pool, "api_invalid").await;
    let sugar = common::create_ingredient(&pool, &common::unique("sugar"), "g").await;

    let body = json!({
        "ingredients": [{"id": sugar, "amount": 10}, {"id": sugar, "amount": 20}],
        "tags": [],
        "image": common::png_data_uri(b"x"),
        "name": "Double sugar",
        "text": "Too sweet.",
        "cooking_time": 5
    });
    let (status, error) = send_json(&app, request("POST", "/recipes", Some(author), Some(body))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error_code"], "validation_error");
    assert_eq!(error["details"]["ingredient_id"], sugar);
}

#[tokio::test]
async fn test_put_is_refused_and_patch_replaces() {
    let Some(pool) = common::setup_test_db().await else { return };
    let (_dir, images) = common::image_store();
    let app = app(&pool, images.clone());

    let author = common::create_user(&pool, "api_patch").await;
    let flour = common::create_ingredient(&pool, &common::unique("flour"), "g").await;
    let milk = common::create_ingredient(&pool, &common::unique("milk"), "ml").await;
    let recipe = common::create_recipe(&pool, images, author, "Batter", &[(flour, 100)], &[]).await;

    let body = json!({
        "ingredients": [{"id": milk, "amount": 300}],
        "tags": [],
        "image": common::png_data_uri(b"batter-v2"),
        "name": "Thin batter",
        "text": "More milk.",
        "cooking_time": 10
    });
    let uri = format!("/recipes/{}", recipe.id);

    let (status, error) = send_json(&app, request("PUT", &uri, Some(author), Some(body.clone()))).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(error["error_code"], "invalid_operation");

    let (status, view) = send_json(&app, request("PATCH", &uri, Some(author), Some(body))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["name"], "Thin batter");
    assert_eq!(view["ingredients"].as_array().unwrap().len(), 1);
    assert_eq!(view["ingredients"][0]["id"], milk);

    // Missing fields are a validation failure, not a merge
    let (status, error) = send_json(
        &app,
        request("PATCH", &uri, Some(author), Some(json!({"name": "Only a name"}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error_code"], "validation_error");
}

#[tokio::test]
async fn test_subscriptions_api() {
    let Some(pool) = common::setup_test_db().await else { return };
    let (_dir, images) = common::image_store();
    let app = app(&pool, images.clone());

    let author = common::create_user(&pool, "api_chef").await;
    let follower = common::create_user(&pool, "api_follower").await;
    let flour = common::create_ingredient(&pool, &common::unique("flour"), "g").await;
    common::create_recipe(&pool, images.clone(), author, "First", &[(flour, 1)], &[]).await;
    common::create_recipe(&pool, images, author, "Second", &[(flour, 1)], &[]).await;

    let subscribe_uri = format!("/users/{}/subscribe?recipes_limit=1", author);
    let (status, entry) = send_json(&app, request("POST", &subscribe_uri, Some(follower), None)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["is_subscribed"], true);
    assert_eq!(entry["recipes_count"], 2);
    assert_eq!(entry["recipes"].as_array().unwrap().len(), 1);

    let self_uri = format!("/users/{}/subscribe", follower);
    let (status, error) = send_json(&app, request("POST", &self_uri, Some(follower), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error_code"], "invalid_operation");

    let (status, list) = send_json(&app, request("GET", "/users/subscriptions", Some(follower), None)).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], author);
    assert_eq!(list[0]["recipes"].as_array().unwrap().len(), 2);

    let (status, profile) = send_json(
        &app,
        request("GET", &format!("/users/{}", author), Some(follower), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["is_subscribed"], true);

    let (status, me) = send_json(&app, request("GET", "/users/me", Some(follower), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], follower);

    let (status, _) = send_json(&app, request("GET", "/users/me", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_catalog_reads_and_auth() {
    let Some(pool) = common::setup_test_db().await else { return };
    let (_dir, images) = common::image_store();
    let app = app(&pool, images);

    let token = common::unique("zest");
    let exact = common::create_ingredient(&pool, &token, "g").await;
    let contains = common::create_ingredient(&pool, &format!("lemon {}", token), "g").await;
    let (tag, _) = common::create_tag(&pool, "api_catalog").await;

    let (status, found) = send_json(
        &app,
        request("GET", &format!("/ingredients?name={}", token), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = found
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![exact, contains]);

    let (status, tag_json) = send_json(&app, request("GET", &format!("/tags/{}", tag), None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tag_json["id"], tag);

    let (status, _) = send_json(&app, request("GET", "/ingredients/0", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Missing API key
    let req = Request::builder().uri("/tags").body(Body::empty()).unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Malformed end-user header
    let req = Request::builder()
        .uri("/tags")
        .header("X-API-Key", common::API_KEY)
        .header("X-Request-User-Id", "not-a-number")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
