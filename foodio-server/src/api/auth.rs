//! Registration and login

use axum::{Json, extract::State, http::StatusCode};
use shared::error::AppError;
use shared::models::{LoginRequest, LoginResponse, RegisterRequest, User};

use super::{ApiResult, AppJson};
use crate::identity;
use crate::state::AppState;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = identity::register(state.repos.users.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let response = identity::login(state.repos.users.as_ref(), &state.jwt, req).await?;
    Ok(Json(response))
}
