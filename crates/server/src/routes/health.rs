use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use deployment::Deployment;
use serde::Serialize;
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub orders: i64,
    pub database: String,
}

/// GET /api/health
/// Reports whether the order table can be read.
pub async fn health(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<HealthStatus>>, ApiError> {
    let orders = deployment.orders().count().await?;
    Ok(ResponseJson(ApiResponse::success(HealthStatus {
        status: "ok",
        orders,
        database: deployment.db().path().display().to_string(),
    })))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/health", get(health))
}
