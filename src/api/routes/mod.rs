use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::auth::middleware::auth_middleware;
use crate::AppState;

pub fn create_router(_state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/users/login", post(handlers::user::login))
        .route("/users/profile", get(handlers::user::profile))
        .route("/spin/recent-wins", get(handlers::spin::recent_wins));

    // Protected routes (FID bearer auth required)
    let protected_routes = Router::new()
        .route("/spin/prepare", post(handlers::spin::prepare_spin))
        .route("/spin/verify", post(handlers::spin::verify_spin))
        .route("/users/claim-ticket", post(handlers::user::claim_ticket))
        .layer(axum_middleware::from_fn(auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
