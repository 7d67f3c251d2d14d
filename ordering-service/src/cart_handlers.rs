use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common_http_errors::{ApiError, ApiResult};

use crate::results::{DeleteResult, InsertResult};
use crate::AppState;

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CartItem {
    pub id: Uuid,
    #[serde(rename = "menuId")]
    pub menu_item_id: Option<Uuid>,
    pub name: String,
    pub image: Option<String>,
    pub price: f64,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct NewCartItem {
    #[serde(rename = "menuId")]
    pub menu_item_id: Option<Uuid>,
    pub name: String,
    pub image: Option<String>,
    pub price: f64,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub email: Option<String>,
}

/// Carts are keyed by the owner's email; no email means no cart.
pub async fn list_cart(
    State(state): State<AppState>,
    Query(params): Query<CartQuery>,
) -> ApiResult<Json<Vec<CartItem>>> {
    let Some(email) = params.email else {
        return Ok(Json(Vec::new()));
    };

    let items = sqlx::query_as::<_, CartItem>(
        "SELECT id, menu_item_id, name, image, price, email FROM cart_items WHERE email = $1",
    )
    .bind(&email)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::internal)?;
    Ok(Json(items))
}

pub async fn add_cart_item(
    State(state): State<AppState>,
    Json(item): Json<NewCartItem>,
) -> ApiResult<Json<InsertResult>> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO cart_items (id, menu_item_id, name, image, price, email) VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(id)
    .bind(item.menu_item_id)
    .bind(&item.name)
    .bind(&item.image)
    .bind(item.price)
    .bind(&item.email)
    .execute(&state.db)
    .await
    .map_err(ApiError::internal)?;

    Ok(Json(InsertResult::inserted(id)))
}

pub async fn delete_cart_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteResult>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(DeleteResult { deleted_count: result.rows_affected() }))
}
