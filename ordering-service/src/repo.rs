use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use anyhow::Result;

/// Checkout payload as supplied by the frontend. The cart ids are taken at
/// face value; nothing re-checks that each one belongs to the paying email.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub email: String,
    #[serde(rename = "price")]
    pub amount: f64,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    pub cart_ids: Vec<Uuid>,
    pub menu_item_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub email: String,
    #[serde(rename = "price")]
    pub amount: f64,
    pub transaction_id: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "date")]
    pub paid_at: DateTime<Utc>,
    pub cart_ids: Vec<Uuid>,
    pub menu_item_ids: Vec<Uuid>,
}

#[derive(Debug)]
pub struct ReconcileOutcome {
    pub inserted_id: Uuid,
    pub deleted_count: u64,
}

/// Records a payment and clears the purchased cart entries.
///
/// The insert and the bulk delete are two separate statements with no
/// surrounding transaction: if the second fails after the first succeeded,
/// the payment stands and the cart keeps its rows. Wrapping both in one
/// transaction scope is a known improvement over the current contract.
pub async fn record_payment(db: &PgPool, payment: &NewPayment) -> Result<ReconcileOutcome> {
    let id = Uuid::new_v4();
    let paid_at = payment.date.unwrap_or_else(Utc::now);

    sqlx::query(
        r#"INSERT INTO payments (id, email, amount, transaction_id, status, paid_at, cart_ids, menu_item_ids)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
    )
    .bind(id)
    .bind(&payment.email)
    .bind(payment.amount)
    .bind(&payment.transaction_id)
    .bind(&payment.status)
    .bind(paid_at)
    .bind(&payment.cart_ids)
    .bind(&payment.menu_item_ids)
    .execute(db)
    .await?;

    let deleted = sqlx::query("DELETE FROM cart_items WHERE id = ANY($1)")
        .bind(&payment.cart_ids)
        .execute(db)
        .await?;

    Ok(ReconcileOutcome {
        inserted_id: id,
        deleted_count: deleted.rows_affected(),
    })
}

pub async fn payments_for(db: &PgPool, email: &str) -> Result<Vec<Payment>> {
    let rows = sqlx::query_as::<_, Payment>(
        r#"SELECT id, email, amount, transaction_id, status, paid_at, cart_ids, menu_item_ids
           FROM payments WHERE email = $1 ORDER BY paid_at DESC"#,
    )
    .bind(email)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
