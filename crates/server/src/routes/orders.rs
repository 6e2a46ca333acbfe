//! JSON API over the same operations as the HTML form.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::order::Order;
use deployment::Deployment;
use serde::Serialize;
use services::services::{
    catalog::{DropdownOptions, all_dropdowns},
    order_form::{DEFAULT_LEAD_TIME_DAYS, LEAD_TIME_DAYS, OrderForm},
};
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Serialize)]
pub struct LeadTimeBounds {
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

#[derive(Debug, Serialize)]
pub struct FormOptions {
    pub dropdowns: Vec<DropdownOptions>,
    pub lead_time_days: LeadTimeBounds,
}

#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub deleted: bool,
}

/// GET /api/orders
pub async fn list_orders(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<Order>>>, ApiError> {
    let orders = deployment.orders().list().await?;
    Ok(ResponseJson(ApiResponse::success(orders)))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Order>>, ApiError> {
    let order = deployment.orders().get(id).await?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

/// POST /api/orders
/// Validate and save; the order date is today.
pub async fn create_order(
    State(deployment): State<DeploymentImpl>,
    payload: Result<Json<OrderForm>, JsonRejection>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Order>>), ApiError> {
    let Json(payload) = payload?;
    let order = deployment.orders().create(&payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(order))))
}

/// PUT /api/orders/{id}
/// Full replacement; the stored order date is kept.
pub async fn update_order(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
    payload: Result<Json<OrderForm>, JsonRejection>,
) -> Result<ResponseJson<ApiResponse<Order>>, ApiError> {
    let Json(payload) = payload?;
    let order = deployment.orders().update(id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

/// DELETE /api/orders/{id}
pub async fn delete_order(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<DeleteResult>>, ApiError> {
    let deleted = deployment.orders().delete(id).await?;
    Ok(ResponseJson(ApiResponse::success(DeleteResult { deleted })))
}

/// GET /api/options
/// Dropdown contents and lead time bounds for clients building their own form.
pub async fn form_options() -> ResponseJson<ApiResponse<FormOptions>> {
    ResponseJson(ApiResponse::success(FormOptions {
        dropdowns: all_dropdowns(),
        lead_time_days: LeadTimeBounds {
            min: *LEAD_TIME_DAYS.start(),
            max: *LEAD_TIME_DAYS.end(),
            default: DEFAULT_LEAD_TIME_DAYS,
        },
    }))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/options", get(form_options))
}
