//! Profile and user administration endpoints

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{ProfileUpdate, User, UserUpdate};

use super::{ApiResult, AppJson};
use crate::auth::CurrentUser;
use crate::db::RepoError;
use crate::identity;
use crate::state::AppState;

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::UserNotFound).with_detail("user_id", id)
}

async fn load(state: &AppState, id: i64) -> Result<User, AppError> {
    state
        .repos
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// GET /users/me
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<User> {
    Ok(Json(load(&state, user.id).await?))
}

/// PUT /users/me
pub async fn update_me(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(update): AppJson<ProfileUpdate>,
) -> ApiResult<User> {
    let updated = identity::update_user(state.repos.users.as_ref(), user.id, update.into()).await?;
    Ok(Json(updated))
}

/// GET /users (admin)
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    Ok(Json(state.repos.users.list().await?))
}

/// GET /users/{id} (admin)
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<User> {
    Ok(Json(load(&state, id).await?))
}

/// PUT /users/{id} (admin)
pub async fn update(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<i64>,
    AppJson(update): AppJson<UserUpdate>,
) -> ApiResult<User> {
    let updated = identity::update_user(state.repos.users.as_ref(), id, update).await?;
    tracing::info!(user_id = id, admin_id = admin.id, role = %updated.role, "User updated");
    Ok(Json(updated))
}

/// DELETE /users/{id} (admin)
pub async fn delete(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if admin.id == id {
        return Err(AppError::new(ErrorCode::UserCannotDeleteSelf));
    }
    state.repos.users.delete(id).await.map_err(|e| match e {
        RepoError::NotFound(_) => not_found(id),
        other => other.into(),
    })?;
    tracing::info!(user_id = id, admin_id = admin.id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
