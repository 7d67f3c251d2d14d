use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common_auth::AuthContext;
use common_http_errors::{ApiError, ApiResult};

use crate::guards::ensure_self;
use crate::repo::{self, NewPayment, Payment};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct IntentRequest {
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct IntentResponse {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

/// Asks the payment provider for a client secret covering the given price.
/// The float price is converted to integer minor units before the call.
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(req): Json<IntentRequest>,
) -> ApiResult<Json<IntentResponse>> {
    let amount_minor = (req.price * 100.0) as i64;

    let intent = state
        .gateway
        .create_intent(amount_minor, "usd")
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(IntentResponse { client_secret: intent.client_secret }))
}

pub async fn payment_history(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(email): Path<String>,
) -> ApiResult<Json<Vec<Payment>>> {
    ensure_self(&auth, &email)?;

    let payments = repo::payments_for(&state.db, &email)
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(payments))
}

#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    #[serde(rename = "insertedId")]
    pub inserted_id: Uuid,
    #[serde(rename = "deletedCount")]
    pub deleted_count: u64,
}

/// Records the payment and clears the purchased cart entries, reporting both
/// outcomes so the caller can confirm each took effect.
pub async fn record_payment(
    State(state): State<AppState>,
    Json(payment): Json<NewPayment>,
) -> ApiResult<Json<ReconcileResponse>> {
    let outcome = repo::record_payment(&state.db, &payment)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(ReconcileResponse {
        inserted_id: outcome.inserted_id,
        deleted_count: outcome.deleted_count,
    }))
}
