pub mod app;
pub mod cart_handlers;
pub mod gateway;
pub mod guards;
pub mod menu_handlers;
pub mod payment_handlers;
pub mod repo;
pub mod results;
pub mod review_handlers;
pub mod stats_handlers;
pub mod user_handlers;

pub use app::{build_auth_config_from_env, build_router, AppState};
