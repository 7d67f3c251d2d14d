use axum::extract::State;
use axum::Json;
use serde::Serialize;

use common_auth::AuthContext;
use common_http_errors::{ApiError, ApiResult};

use crate::guards::ensure_admin;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub users: i64,
    #[serde(rename = "menuItems")]
    pub menu_items: i64,
    pub orders: i64,
    pub revenue: f64,
}

pub async fn admin_stats(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<AdminStats>> {
    ensure_admin(&state.db, &auth).await?;

    let users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::internal)?;
    let menu_items = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM menu_items")
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::internal)?;
    let orders = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM payments")
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::internal)?;
    let revenue = sqlx::query_scalar::<_, f64>("SELECT COALESCE(SUM(amount), 0) FROM payments")
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(AdminStats {
        users,
        menu_items,
        orders,
        revenue: (revenue * 100.0).round() / 100.0,
    }))
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct OrderStat {
    pub category: String,
    pub quantity: i64,
    pub revenue: f64,
}

/// Per-category order volume and revenue: each payment's menu item ids are
/// unnested and joined back to the menu before grouping.
pub async fn order_stats(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<OrderStat>>> {
    ensure_admin(&state.db, &auth).await?;

    let stats = sqlx::query_as::<_, OrderStat>(
        r#"SELECT m.category, COUNT(*) AS quantity, COALESCE(SUM(m.price), 0) AS revenue
           FROM payments p
           CROSS JOIN LATERAL unnest(p.menu_item_ids) AS item_id
           JOIN menu_items m ON m.id = item_id
           GROUP BY m.category
           ORDER BY m.category"#,
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::internal)?;

    Ok(Json(stats))
}
