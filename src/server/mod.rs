//! HTTP API for the restaurant server.
//!
//! Public routes map one-to-one onto document store operations. The only
//! protected route is `GET /myorders`, which sits behind
//! [`auth::require_session`].

pub mod auth;
pub mod error;
pub mod foods;
pub mod orders;
pub mod session;
pub mod tokens;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::db::{Collection, FOODS, ORDERS};
pub use auth::{AuthUser, CookiePolicy};
pub use error::ApiError;
pub use tokens::{TokenError, TokenService};

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub foods: Collection,
    pub orders: Collection,
    pub tokens: Arc<TokenService>,
    pub cookies: CookiePolicy,
}

impl AppState {
    pub fn new(pool: SqlitePool, tokens: TokenService, cookies: CookiePolicy) -> Self {
        Self {
            foods: Collection::new(pool.clone(), FOODS),
            orders: Collection::new(pool, ORDERS),
            tokens: Arc::new(tokens),
            cookies,
        }
    }
}

async fn root() -> &'static str {
    "Restaurant management server is running"
}

/// Builds the full router.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/foods", get(foods::list_foods))
        .route(
            "/foods/{id}",
            get(foods::get_food).patch(foods::update_sold_items),
        )
        .route(
            "/updatefood/{id}",
            get(foods::get_food).patch(foods::update_food),
        )
        .route("/myfoods", get(foods::list_provider_foods))
        .route("/topfoods", get(foods::top_foods))
        .route("/countfoods", get(foods::count_foods))
        .route("/pagination", get(foods::paginate_foods))
        .route("/addfood", post(foods::add_food))
        .route("/order", post(orders::create_order))
        .route("/myorders/{id}", delete(orders::delete_order))
        .route("/jwt", post(session::login))
        .route("/logout", post(session::logout));

    let protected_routes = Router::new()
        .route("/myorders", get(orders::my_orders))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    const SECRET: &[u8] = b"router-test-secret";

    struct TestContext {
        app: Router,
        state: AppState,
        _temp_dir: TempDir, // Keep alive for duration of test
    }

    async fn setup() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_dir.path().join("test.db")).await.unwrap();
        let tokens = TokenService::new(SECRET).unwrap();
        let state = AppState::new(pool, tokens, CookiePolicy::new(false));
        TestContext {
            app: router(state.clone()),
            state,
            _temp_dir: temp_dir,
        }
    }

    impl TestContext {
        async fn send(&self, request: Request<Body>) -> Response {
            self.app.clone().oneshot(request).await.unwrap()
        }

        async fn get(&self, uri: &str) -> Response {
            self.send(Request::get(uri).body(Body::empty()).unwrap())
                .await
        }

        async fn get_with_cookie(&self, uri: &str, cookie: &str) -> Response {
            self.send(
                Request::get(uri)
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
        }

        async fn send_json(&self, method: Method, uri: &str, body: Value) -> Response {
            self.send(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
        }

        async fn add_food(&self, name: &str, provider: &str, sold: i64) -> String {
            let response = self
                .send_json(Method::POST, "/addfood", food_json(name, provider, sold))
                .await;
            assert_eq!(response.status(), StatusCode::OK);
            body_json(response).await["insertedId"]
                .as_str()
                .unwrap()
                .to_string()
        }
    }

    fn food_json(name: &str, provider: &str, sold: i64) -> Value {
        json!({
            "providerEmail": provider,
            "providerName": "Provider",
            "foodName": name,
            "category": "Mains",
            "quantity": 10,
            "price": 12.5,
            "photo": "https://img.example.com/food.jpg",
            "description": "Tasty",
            "soldItems": sold
        })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn food_names(body: &Value) -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|f| f["foodName"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_root_is_plain_text() {
        let ctx = setup().await;
        let response = ctx.get("/").await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Restaurant management server is running");
    }

    #[tokio::test]
    async fn test_add_and_get_food() {
        let ctx = setup().await;
        let id = ctx.add_food("Biryani", "chef@x.com", 0).await;

        for uri in [format!("/foods/{id}"), format!("/updatefood/{id}")] {
            let response = ctx.get(&uri).await;
            assert_eq!(response.status(), StatusCode::OK);
            let body = body_json(response).await;
            assert_eq!(body["_id"], json!(id));
            assert_eq!(body["foodName"], json!("Biryani"));
        }
    }

    #[tokio::test]
    async fn test_get_missing_food_is_not_found() {
        let ctx = setup().await;
        let response = ctx.get(&format!("/foods/{}", uuid::Uuid::new_v4())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], json!("food not found"));
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let ctx = setup().await;

        let response = ctx.get("/foods/12345").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ctx
            .send(
                Request::delete("/myorders/not-an-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_add_food_rejects_incomplete_body() {
        let ctx = setup().await;
        let response = ctx
            .send_json(Method::POST, "/addfood", json!({ "foodName": "Nameless" }))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ctx.state.foods.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_food_without_json_content_type_is_unsupported() {
        let ctx = setup().await;
        let response = ctx
            .send(
                Request::post("/addfood")
                    .body(Body::from(food_json("Pho", "a@x.com", 0).to_string()))
                    .unwrap(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body_json(response).await["message"].is_string());
        assert_eq!(ctx.state.foods.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_foods_and_filter_by_provider() {
        let ctx = setup().await;
        ctx.add_food("Tacos", "a@x.com", 0).await;
        ctx.add_food("Burrito", "b@x.com", 0).await;
        ctx.add_food("Nachos", "a@x.com", 0).await;

        let all = body_json(ctx.get("/foods").await).await;
        assert_eq!(food_names(&all), vec!["Tacos", "Burrito", "Nachos"]);

        let mine = body_json(ctx.get("/foods?ownerEmail=a@x.com").await).await;
        assert_eq!(food_names(&mine), vec!["Tacos", "Nachos"]);

        let legacy = body_json(ctx.get("/myfoods?email=b@x.com").await).await;
        assert_eq!(food_names(&legacy), vec!["Burrito"]);

        let response = ctx.get("/myfoods").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_top_foods_sorted_by_sold_items() {
        let ctx = setup().await;
        for (i, sold) in [10, 5, 20, 1, 7, 3, 15].into_iter().enumerate() {
            ctx.add_food(&format!("food-{i}"), "a@x.com", sold).await;
        }

        let body = body_json(ctx.get("/topfoods").await).await;
        let sold: Vec<i64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["soldItems"].as_i64().unwrap())
            .collect();

        assert_eq!(sold, vec![20, 15, 10, 7, 5, 3]);
    }

    #[tokio::test]
    async fn test_count_foods() {
        let ctx = setup().await;
        ctx.add_food("One", "a@x.com", 0).await;
        ctx.add_food("Two", "a@x.com", 0).await;

        let body = body_json(ctx.get("/countfoods").await).await;
        assert_eq!(body, json!({ "countfoods": 2 }));
    }

    #[tokio::test]
    async fn test_pagination_returns_requested_page() {
        let ctx = setup().await;
        for n in 1..=20 {
            ctx.add_food(&format!("item-{n}"), "a@x.com", 0).await;
        }

        let body = body_json(ctx.get("/pagination?page=1&size=5").await).await;
        assert_eq!(
            food_names(&body),
            vec!["item-6", "item-7", "item-8", "item-9", "item-10"]
        );

        let last = body_json(ctx.get("/pagination?page=3&size=5").await).await;
        assert_eq!(food_names(&last).len(), 5);

        let beyond = body_json(ctx.get("/pagination?page=4&size=5").await).await;
        assert!(beyond.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pagination_rejects_invalid_params() {
        let ctx = setup().await;

        for uri in [
            "/pagination",
            "/pagination?page=x&size=5",
            "/pagination?page=0&size=0",
        ] {
            let response = ctx.get(uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_update_sold_items_only() {
        let ctx = setup().await;
        let id = ctx.add_food("Laksa", "a@x.com", 2).await;

        let response = ctx
            .send_json(
                Method::PATCH,
                &format!("/foods/{id}"),
                json!({ "soldItems": 9, "foodName": "ignored" }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let result = body_json(response).await;
        assert_eq!(result["matchedCount"], json!(1));
        assert_eq!(result["modifiedCount"], json!(1));

        let food = body_json(ctx.get(&format!("/foods/{id}")).await).await;
        assert_eq!(food["soldItems"], json!(9));
        assert_eq!(food["foodName"], json!("Laksa"));
    }

    #[tokio::test]
    async fn test_full_update_is_idempotent() {
        let ctx = setup().await;
        let id = ctx.add_food("Dal", "a@x.com", 4).await;
        let update = food_json("Dal Makhani", "a@x.com", 4);
        let uri = format!("/updatefood/{id}");

        let first = body_json(ctx.send_json(Method::PATCH, &uri, update.clone()).await).await;
        assert_eq!(first["modifiedCount"], json!(1));
        let after_first = body_json(ctx.get(&uri).await).await;

        let second = body_json(ctx.send_json(Method::PATCH, &uri, update).await).await;
        assert_eq!(second["matchedCount"], json!(1));
        assert_eq!(second["modifiedCount"], json!(0));
        let after_second = body_json(ctx.get(&uri).await).await;

        assert_eq!(after_first, after_second);
        assert_eq!(after_second["foodName"], json!("Dal Makhani"));
    }

    #[tokio::test]
    async fn test_full_update_without_sold_items_keeps_count() {
        let ctx = setup().await;
        let id = ctx.add_food("Dal", "a@x.com", 42).await;
        let uri = format!("/updatefood/{id}");

        let mut update = food_json("Dal Tadka", "a@x.com", 0);
        update.as_object_mut().unwrap().remove("soldItems");

        let response = ctx.send_json(Method::PATCH, &uri, update).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["modifiedCount"], json!(1));

        let food = body_json(ctx.get(&uri).await).await;
        assert_eq!(food["foodName"], json!("Dal Tadka"));
        assert_eq!(food["soldItems"], json!(42));
    }

    #[tokio::test]
    async fn test_update_missing_food_matches_nothing() {
        let ctx = setup().await;
        let response = ctx
            .send_json(
                Method::PATCH,
                &format!("/foods/{}", uuid::Uuid::new_v4()),
                json!({ "soldItems": 1 }),
            )
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["matchedCount"], json!(0));
    }

    #[tokio::test]
    async fn test_login_sets_cookie() {
        let ctx = setup().await;
        let response = ctx
            .send_json(Method::POST, "/jwt", json!({ "email": "a@x.com" }))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));

        let token = cookie
            .trim_start_matches("token=")
            .split(';')
            .next()
            .unwrap();
        assert_eq!(ctx.state.tokens.verify(token).unwrap().email, "a@x.com");
        assert_eq!(body_json(response).await, json!({ "success": true }));
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let ctx = setup().await;
        let response = ctx.send(Request::post("/logout").body(Body::empty()).unwrap()).await;

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers().get(header::SET_COOKIE).unwrap();
        assert!(cookie.to_str().unwrap().starts_with("token=; Max-Age=0"));
    }

    #[tokio::test]
    async fn test_my_orders_without_cookie_is_unauthorized() {
        let ctx = setup().await;
        let response = ctx.get("/myorders?email=a@x.com").await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], json!("not authorized"));
    }

    #[tokio::test]
    async fn test_my_orders_with_expired_token_is_unauthorized() {
        let ctx = setup().await;
        let token = ctx
            .state
            .tokens
            .issue_at("a@x.com", Utc::now() - Duration::hours(2))
            .unwrap();

        let response = ctx
            .get_with_cookie("/myorders?email=a@x.com", &format!("token={token}"))
            .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await["message"],
            json!("unauthorized access")
        );
    }

    #[tokio::test]
    async fn test_my_orders_with_forged_token_is_unauthorized() {
        let ctx = setup().await;
        let forger = TokenService::new(b"not-the-server-secret").unwrap();
        let token = forger.issue("a@x.com").unwrap();

        let response = ctx
            .get_with_cookie("/myorders?email=a@x.com", &format!("token={token}"))
            .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_my_orders_for_other_user_is_forbidden() {
        let ctx = setup().await;
        let token = ctx.state.tokens.issue("a@x.com").unwrap();

        let response = ctx
            .get_with_cookie("/myorders?email=b@x.com", &format!("token={token}"))
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["message"], json!("forbidden access"));
    }

    #[tokio::test]
    async fn test_my_orders_returns_only_own_orders() {
        let ctx = setup().await;
        for (buyer, dish) in [("a@x.com", "Ramen"), ("b@x.com", "Udon"), ("a@x.com", "Soba")] {
            let response = ctx
                .send_json(
                    Method::POST,
                    "/order",
                    json!({ "buyerEmail": buyer, "foodName": dish }),
                )
                .await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        let token = ctx.state.tokens.issue("a@x.com").unwrap();
        let response = ctx
            .get_with_cookie(
                "/myorders?email=a@x.com",
                &format!("theme=dark; token={token}"),
            )
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(food_names(&body), vec!["Ramen", "Soba"]);
    }

    #[tokio::test]
    async fn test_token_survives_logout() {
        let ctx = setup().await;
        let token = ctx.state.tokens.issue("a@x.com").unwrap();

        ctx.send(Request::post("/logout").body(Body::empty()).unwrap())
            .await;

        let response = ctx
            .get_with_cookie("/myorders?email=a@x.com", &format!("token={token}"))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_delete_order() {
        let ctx = setup().await;
        let response = ctx
            .send_json(Method::POST, "/order", json!({ "buyerEmail": "a@x.com" }))
            .await;
        let id = body_json(response).await["insertedId"]
            .as_str()
            .unwrap()
            .to_string();

        let delete = |id: String| Request::delete(format!("/myorders/{id}")).body(Body::empty()).unwrap();

        let first = body_json(ctx.send(delete(id.clone())).await).await;
        assert_eq!(first["deletedCount"], json!(1));

        let second = ctx.send(delete(id)).await;
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(body_json(second).await["deletedCount"], json!(0));
    }
}
