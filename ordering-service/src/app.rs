use std::env;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderName, HeaderValue, Method, StatusCode,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};

use common_auth::{AuthConfig, TokenIssuer, TokenVerifier};

use crate::cart_handlers::{add_cart_item, delete_cart_item, list_cart};
use crate::gateway::PaymentGateway;
use crate::menu_handlers::{create_menu, delete_menu, get_menu, list_menus};
use crate::payment_handlers::{create_payment_intent, payment_history, record_payment};
use crate::review_handlers::list_reviews;
use crate::stats_handlers::{admin_stats, order_stats};
use crate::user_handlers::{
    check_admin, create_user, delete_user, issue_token, list_users, promote_admin,
};

// --- Error metrics (status >= 400, keyed by X-Error-Code) ---
pub static ORDERING_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);
static HTTP_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let v = IntCounterVec::new(
        Opts::new("http_errors_total", "Count of HTTP error responses emitted (status >= 400)"),
        &["service", "code", "status"],
    ).unwrap();
    ORDERING_REGISTRY.register(Box::new(v.clone())).ok();
    v
});

pub async fn http_error_metrics(req: axum::http::Request<axum::body::Body>, next: axum::middleware::Next) -> axum::response::Response {
    let resp = next.run(req).await;
    let status = resp.status();
    if status.as_u16() >= 400 {
        let code = resp.headers().get("X-Error-Code").and_then(|v| v.to_str().ok()).unwrap_or("unknown");
        HTTP_ERRORS_TOTAL.with_label_values(&["ordering-service", code, status.as_str()]).inc();
    }
    resp
}

pub async fn health() -> &'static str { "ok" }

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub issuer: Arc<TokenIssuer>,
    pub verifier: Arc<TokenVerifier>,
    pub gateway: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub fn new(db: PgPool, auth: &AuthConfig, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            db,
            issuer: Arc::new(TokenIssuer::new(auth)),
            verifier: Arc::new(TokenVerifier::new(auth)),
            gateway,
        }
    }
}

impl axum::extract::FromRef<AppState> for Arc<TokenVerifier> {
    fn from_ref(state: &AppState) -> Self { state.verifier.clone() }
}

pub fn build_auth_config_from_env() -> anyhow::Result<AuthConfig> {
    let secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

    let mut config = AuthConfig::new(secret);
    if let Ok(value) = env::var("JWT_LEEWAY_SECONDS") {
        if let Ok(leeway) = value.parse::<u32>() { config = config.with_leeway(leeway); }
    }
    Ok(config)
}

pub fn build_router(state: AppState) -> Router {
    let allowed_origins = [
        "http://localhost:3000",
        "http://localhost:5173",
    ];
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            allowed_origins.iter().filter_map(|o| o.parse::<HeaderValue>().ok()).collect::<Vec<_>>(),
        ))
        .allow_methods([
            Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS,
        ])
        .allow_headers([
            ACCEPT, CONTENT_TYPE, HeaderName::from_static("authorization"),
        ]);

    async fn metrics() -> (StatusCode, String) {
        let encoder = TextEncoder::new();
        let families = ORDERING_REGISTRY.gather();
        let mut buf = Vec::new();
        if let Err(e) = encoder.encode(&families, &mut buf) {
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
        }
        (StatusCode::OK, String::from_utf8_lossy(&buf).to_string())
    }

    Router::new()
        .route("/healthz", get(health))
        .route("/jwt", post(issue_token))
        .route("/users", get(list_users).post(create_user))
        // GET takes an email, PATCH a user id; axum wants one parameter name
        // per segment, so both hang off :id.
        .route("/users/admin/:id", get(check_admin).patch(promote_admin))
        .route("/users/:id", axum::routing::delete(delete_user))
        .route("/menus", get(list_menus).post(create_menu))
        .route("/menus/:id", get(get_menu).delete(delete_menu))
        .route("/reviews", get(list_reviews))
        .route("/carts", get(list_cart).post(add_cart_item))
        .route("/carts/:id", axum::routing::delete(delete_cart_item))
        .route("/create-payment-intent", post(create_payment_intent))
        .route("/payments", post(record_payment))
        .route("/payments/:email", get(payment_history))
        .route("/admin-stats", get(admin_stats))
        .route("/order-stats", get(order_stats))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn(http_error_metrics))
}
