//! Food item routes.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ApiError;
use super::AppState;
use crate::db::{Document, Filter, FindOptions, InsertOneResult, UpdateResult};
use crate::models::{Food, FoodUpdate, SoldItemsUpdate, PROVIDER_EMAIL, SOLD_ITEMS};

/// Number of foods returned by `GET /topfoods`.
pub const TOP_FOODS_LIMIT: u64 = 6;

#[derive(Debug, Deserialize)]
pub struct FoodsQuery {
    #[serde(rename = "ownerEmail")]
    owner_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

/// Raw `page`/`size` values; parsed by [`PaginationQuery::to_options`].
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    page: Option<String>,
    size: Option<String>,
}

impl PaginationQuery {
    fn to_options(&self) -> Result<FindOptions, ApiError> {
        let page: u64 = parse_param("page", self.page.as_deref())?;
        let size: u64 = parse_param("size", self.size.as_deref())?;
        if size == 0 {
            return Err(ApiError::BadRequest("size must be at least 1".to_string()));
        }
        let skip = page
            .checked_mul(size)
            .ok_or_else(|| ApiError::BadRequest("page is out of range".to_string()))?;

        Ok(FindOptions::new().skip(skip).limit(size))
    }
}

fn parse_param(name: &str, value: Option<&str>) -> Result<u64, ApiError> {
    let value = value.ok_or_else(|| ApiError::BadRequest(format!("{} is required", name)))?;
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{} must be a non-negative integer", name)))
}

/// Parses a path segment as a store id.
pub fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::BadRequest(format!("invalid id: {}", id)))
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    countfoods: u64,
}

/// `GET /foods`, optionally narrowed to one provider with `?ownerEmail=`.
pub async fn list_foods(
    State(state): State<AppState>,
    query: Result<Query<FoodsQuery>, QueryRejection>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let Query(query) = query?;
    let filter = match query.owner_email {
        Some(email) => Filter::new().eq(PROVIDER_EMAIL, email),
        None => Filter::new(),
    };

    let foods = state.foods.find(&filter, &FindOptions::new()).await?;
    Ok(Json(foods))
}

/// `GET /myfoods?email=`
pub async fn list_provider_foods(
    State(state): State<AppState>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let Query(query) = query?;
    let email = query
        .email
        .ok_or_else(|| ApiError::BadRequest("email is required".to_string()))?;

    let filter = Filter::new().eq(PROVIDER_EMAIL, email);
    let foods = state.foods.find(&filter, &FindOptions::new()).await?;
    Ok(Json(foods))
}

/// `GET /foods/{id}` and `GET /updatefood/{id}`
pub async fn get_food(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    let id = parse_id(&id)?;

    state
        .foods
        .find_one(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("food not found"))
}

/// `GET /topfoods`: best sellers first.
pub async fn top_foods(State(state): State<AppState>) -> Result<Json<Vec<Document>>, ApiError> {
    let options = FindOptions::new()
        .sort_desc(SOLD_ITEMS)
        .limit(TOP_FOODS_LIMIT);

    let foods = state.foods.find(&Filter::new(), &options).await?;
    Ok(Json(foods))
}

/// `GET /countfoods`
pub async fn count_foods(State(state): State<AppState>) -> Result<Json<CountResponse>, ApiError> {
    let countfoods = state.foods.count().await?;
    Ok(Json(CountResponse { countfoods }))
}

/// `GET /pagination?page=&size=`; pages are zero-based.
pub async fn paginate_foods(
    State(state): State<AppState>,
    query: Result<Query<PaginationQuery>, QueryRejection>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let Query(query) = query?;
    let options = query.to_options()?;

    let foods = state.foods.find(&Filter::new(), &options).await?;
    Ok(Json(foods))
}

/// `POST /addfood`
pub async fn add_food(
    State(state): State<AppState>,
    payload: Result<Json<Food>, JsonRejection>,
) -> Result<Json<InsertOneResult>, ApiError> {
    let Json(food) = payload?;

    let result = state.foods.insert_one(food.to_document()?).await?;
    tracing::info!("Added food {} ({})", result.inserted_id, food.food_name);
    Ok(Json(result))
}

/// `PATCH /foods/{id}`: records a new sold count.
pub async fn update_sold_items(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SoldItemsUpdate>, JsonRejection>,
) -> Result<Json<UpdateResult>, ApiError> {
    let id = parse_id(&id)?;
    let Json(update) = payload?;

    let result = state.foods.update_one(id, update.to_document()).await?;
    Ok(Json(result))
}

/// `PATCH /updatefood/{id}`: replaces every mutable field. An omitted
/// `soldItems` keeps the stored count.
pub async fn update_food(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<FoodUpdate>, JsonRejection>,
) -> Result<Json<UpdateResult>, ApiError> {
    let id = parse_id(&id)?;
    let Json(update) = payload?;

    let result = state.foods.update_one(id, update.to_document()?).await?;
    Ok(Json(result))
}
