use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common_auth::AuthContext;
use common_http_errors::{ApiError, ApiResult};

use crate::guards::ensure_admin;
use crate::results::{DeleteResult, InsertResult};
use crate::AppState;

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct MenuItem {
    pub id: Uuid,
    pub name: String,
    pub recipe: Option<String>,
    pub image: Option<String>,
    pub category: String,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct NewMenuItem {
    pub name: String,
    pub recipe: Option<String>,
    pub image: Option<String>,
    pub category: String,
    pub price: f64,
}

pub async fn list_menus(State(state): State<AppState>) -> ApiResult<Json<Vec<MenuItem>>> {
    let menus = sqlx::query_as::<_, MenuItem>(
        "SELECT id, name, recipe, image, category, price FROM menu_items",
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::internal)?;
    Ok(Json(menus))
}

/// An unknown id answers with JSON null, not 404.
pub async fn get_menu(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Option<MenuItem>>> {
    let menu = sqlx::query_as::<_, MenuItem>(
        "SELECT id, name, recipe, image, category, price FROM menu_items WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::internal)?;
    Ok(Json(menu))
}

pub async fn create_menu(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(menu): Json<NewMenuItem>,
) -> ApiResult<Json<InsertResult>> {
    ensure_admin(&state.db, &auth).await?;

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO menu_items (id, name, recipe, image, category, price) VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(id)
    .bind(&menu.name)
    .bind(&menu.recipe)
    .bind(&menu.image)
    .bind(&menu.category)
    .bind(menu.price)
    .execute(&state.db)
    .await
    .map_err(ApiError::internal)?;

    Ok(Json(InsertResult::inserted(id)))
}

pub async fn delete_menu(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteResult>> {
    ensure_admin(&state.db, &auth).await?;

    let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(DeleteResult { deleted_count: result.rows_affected() }))
}
