//! Authentication middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};

use crate::auth::CurrentUser;
use crate::auth::extractor::authenticate;
use crate::security_log;
use crate::state::AppState;

/// Require a valid bearer token
///
/// Injects [`CurrentUser`] into the request extensions. CORS preflight
/// requests pass through untouched.
///
/// | Failure | Status |
/// |---------|--------|
/// | no `Authorization` header | 401 NotAuthenticated |
/// | expired token | 401 TokenExpired |
/// | malformed or forged token | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let user = authenticate(req.headers(), &state.jwt, req.uri().path())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Require the admin role; must run after [`require_auth`]
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::unauthorized)?;
    if !user.is_admin() {
        security_log!(
            WARN,
            "admin_required",
            user_id = user.id,
            user_role = %user.role,
            uri = req.uri().path()
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }

    Ok(next.run(req).await)
}
