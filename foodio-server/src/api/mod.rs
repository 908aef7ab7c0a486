//! HTTP API
//!
//! | Access | Routes |
//! |--------|--------|
//! | public | `/health`, `/auth/*`, `GET /menu`, `GET /menu/{id}` |
//! | user | `/orders`, `GET /orders/{id}`, `/users/me` |
//! | admin | menu writes, `PUT /orders/{id}/status`, `/users`, `/users/{id}` |

pub mod auth;
pub mod health;
mod json;
pub mod menu;
pub mod orders;
pub mod users;

use axum::routing::{get, post, put};
use axum::{Router, middleware};
use shared::error::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{require_admin, require_auth};
use crate::state::AppState;

pub use json::AppJson;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/menu", get(menu::list))
        .route("/menu/{id}", get(menu::get));

    let authenticated = Router::new()
        .route("/orders", get(orders::list).post(orders::place))
        .route("/orders/{id}", get(orders::get))
        .route("/users/me", get(users::me).put(users::update_me))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // require_auth runs first (outermost), then require_admin
    let admin = Router::new()
        .route("/menu", post(menu::create))
        .route("/menu/{id}", put(menu::update).delete(menu::delete))
        .route("/orders/{id}/status", put(orders::update_status))
        .route("/users", get(users::list))
        .route(
            "/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
