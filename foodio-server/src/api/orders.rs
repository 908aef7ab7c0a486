//! Order endpoints

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Order, PlaceOrderRequest, UpdateOrderStatusRequest};
use uuid::Uuid;

use super::{ApiResult, AppJson};
use crate::auth::CurrentUser;
use crate::state::AppState;

/// Unparseable ids cannot name an existing order
fn parse_order_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", raw))
}

/// GET /orders
pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<Order>> {
    Ok(Json(state.engine.list(&user).await?))
}

/// POST /orders
pub async fn place(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(req): AppJson<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = state.engine.place(req, &user).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/{id}
pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Order> {
    let id = parse_order_id(&id)?;
    Ok(Json(state.engine.get_by_id(id, &user).await?))
}

/// PUT /orders/{id}/status (admin)
///
/// A missing or non-string `status` is reported as an invalid status.
pub async fn update_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<UpdateOrderStatusRequest>, JsonRejection>,
) -> ApiResult<Order> {
    let id = parse_order_id(&id)?;
    let Json(req) = body.map_err(|rejection| match rejection {
        JsonRejection::JsonDataError(err) => AppError::with_message(
            ErrorCode::InvalidOrderStatus,
            "Status must be one of: Pending, Preparing, Ready, Completed",
        )
        .with_detail("reason", err.body_text()),
        other => other.into(),
    })?;
    Ok(Json(state.engine.update_status(id, &req.status, &user).await?))
}
