use axum::{
    Router,
    extract::State,
    http::header,
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::{get, post},
};
use deployment::Deployment;
use services::services::report::ReportSummary;
use utils::response::ApiResponse;

use crate::{
    DeploymentImpl,
    error::{ApiError, PageError},
};

/// GET /report.pdf
/// Regenerate the report file and send it as a download.
pub async fn download_report(
    State(deployment): State<DeploymentImpl>,
) -> Result<Response, PageError> {
    let reports = deployment.reports();
    let report = reports.generate().await?;
    let disposition = format!("attachment; filename=\"{}\"", reports.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.bytes,
    )
        .into_response())
}

/// POST /api/report
/// Regenerate the report file on disk and describe it.
pub async fn generate_report(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<ReportSummary>>, ApiError> {
    let report = deployment.reports().generate().await?;
    Ok(ResponseJson(ApiResponse::success(report.summary)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/report.pdf", get(download_report))
}

pub fn api_router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/report", post(generate_report))
}
