//! Menu catalog endpoints

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate, MenuQuery};

use super::{ApiResult, AppJson};
use crate::auth::CurrentUser;
use crate::db::RepoError;
use crate::state::AppState;

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::MenuItemNotFound).with_detail("menu_item_id", id)
}

fn map_repo(id: i64) -> impl FnOnce(RepoError) -> AppError {
    move |err| match err {
        RepoError::NotFound(_) => not_found(id),
        other => other.into(),
    }
}

/// GET /menu?category=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> ApiResult<Vec<MenuItem>> {
    let items = state.repos.menu.list(query.category_filter()).await?;
    Ok(Json(items))
}

/// GET /menu/{id}
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<MenuItem> {
    let item = state
        .repos
        .menu
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(item))
}

/// POST /menu (admin)
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(payload): AppJson<MenuItemCreate>,
) -> Result<(StatusCode, Json<MenuItem>), AppError> {
    payload.check()?;
    let item = state.repos.menu.create(payload).await?;
    tracing::info!(menu_item_id = item.id, admin_id = user.id, "Menu item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /menu/{id} (admin)
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<MenuItemUpdate>,
) -> ApiResult<MenuItem> {
    payload.check()?;
    let item = state
        .repos
        .menu
        .update(id, payload)
        .await
        .map_err(map_repo(id))?;
    tracing::info!(menu_item_id = id, admin_id = user.id, "Menu item updated");
    Ok(Json(item))
}

/// DELETE /menu/{id} (admin)
///
/// Past order lines keep their price and show `menuItem: null`.
pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.repos.menu.delete(id).await.map_err(map_repo(id))?;
    tracing::info!(menu_item_id = id, admin_id = user.id, "Menu item deleted");
    Ok(StatusCode::NO_CONTENT)
}
