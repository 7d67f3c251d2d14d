use axum::extract::State;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use common_http_errors::{ApiError, ApiResult};

use crate::AppState;

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    pub name: String,
    pub details: Option<String>,
    pub rating: f64,
}

pub async fn list_reviews(State(state): State<AppState>) -> ApiResult<Json<Vec<Review>>> {
    let reviews = sqlx::query_as::<_, Review>("SELECT id, name, details, rating FROM reviews")
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(reviews))
}
