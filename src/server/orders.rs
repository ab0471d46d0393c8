//! Order routes.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};

use super::auth::{ensure_owner, AuthUser};
use super::error::ApiError;
use super::foods::{parse_id, EmailQuery};
use super::AppState;
use crate::db::{DeleteResult, Document, Filter, FindOptions, InsertOneResult};
use crate::models::{Order, BUYER_EMAIL};

/// `POST /order`
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<Order>, JsonRejection>,
) -> Result<Json<InsertOneResult>, ApiError> {
    let Json(order) = payload?;

    let result = state.orders.insert_one(order.to_document()?).await?;
    tracing::info!("Order {} placed by {}", result.inserted_id, order.buyer_email);
    Ok(Json(result))
}

/// `GET /myorders?email=` (session required)
///
/// The email in the query must match the session. The lookup itself always
/// uses the session's email.
pub async fn my_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let Query(query) = query?;
    ensure_owner(&user, query.email.as_deref())?;

    let filter = Filter::new().eq(BUYER_EMAIL, user.email);
    let orders = state.orders.find(&filter, &FindOptions::new()).await?;
    Ok(Json(orders))
}

/// `DELETE /myorders/{id}`. Deleting an unknown id reports `deletedCount: 0`.
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, ApiError> {
    let id = parse_id(&id)?;

    let result = state.orders.delete_one(id).await?;
    Ok(Json(result))
}
