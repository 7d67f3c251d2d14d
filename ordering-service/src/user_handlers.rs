use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common_auth::AuthContext;
use common_http_errors::{ApiError, ApiResult};

use crate::guards::{ensure_admin, ensure_self};
use crate::results::{DeleteResult, InsertResult, UpdateResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(rename = "expiresIn")]
    pub expires_in: i64,
}

/// Issues an access token for whatever identity the caller supplies. The
/// claim is not validated beyond its shape; this mirrors the upstream
/// contract where the frontend trades its signed-in email for a token.
pub async fn issue_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let issued = state.issuer.issue(&req.email).map_err(ApiError::internal)?;
    Ok(Json(TokenResponse {
        token: issued.token,
        expires_in: issued.expires_in,
    }))
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: String,
}

pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<User>>> {
    ensure_admin(&state.db, &auth).await?;

    let users = sqlx::query_as::<_, User>("SELECT id, name, email, role FROM users")
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(users))
}

#[derive(Debug, Serialize)]
pub struct AdminStatus {
    pub admin: bool,
}

pub async fn check_admin(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(email): Path<String>,
) -> ApiResult<Json<AdminStatus>> {
    ensure_self(&auth, &email)?;

    let role = sqlx::query_scalar::<_, Option<String>>("SELECT role FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::internal)?;

    let admin = matches!(role.flatten().as_deref(), Some("admin"));
    Ok(Json(AdminStatus { admin }))
}

/// Registration is create-if-absent: an email already on file yields a no-op
/// result with a null inserted id rather than a duplicate row.
pub async fn create_user(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> ApiResult<Json<InsertResult>> {
    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
        .bind(&new_user.email)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::internal)?;

    if existing.is_some() {
        return Ok(Json(InsertResult::skipped("user already exists")));
    }

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, name, email) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(&new_user.name)
        .bind(&new_user.email)
        .execute(&state.db)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(InsertResult::inserted(id)))
}

pub async fn promote_admin(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UpdateResult>> {
    ensure_admin(&state.db, &auth).await?;

    let result = sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(UpdateResult { modified_count: result.rows_affected() }))
}

pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteResult>> {
    ensure_admin(&state.db, &auth).await?;

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(DeleteResult { deleted_count: result.rows_affected() }))
}
