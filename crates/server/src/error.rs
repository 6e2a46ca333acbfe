use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Json as ResponseJson, Response},
};
use serde::Serialize;
use services::services::{orders::OrderServiceError, report::ReportError};
use thiserror::Error;
use utils::response::ApiResponse;

use crate::templates::{self, TemplateError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Orders(#[from] OrderServiceError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Json(#[from] JsonRejection),
    #[error(transparent)]
    Form(#[from] FormRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Orders(OrderServiceError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Orders(OrderServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Orders(OrderServiceError::Database(_))
            | ApiError::Report(_)
            | ApiError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Json(rejection) => rejection.status(),
            ApiError::Form(rejection) => rejection.status(),
        }
    }

    /// Message safe to show to the operator.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Orders(OrderServiceError::Validation(err)) => err.to_string(),
            ApiError::Orders(OrderServiceError::NotFound(id)) => {
                format!("Pedido {id} não encontrado.")
            }
            ApiError::Orders(OrderServiceError::Database(_)) => {
                "Não foi possível acessar o banco de dados de pedidos.".to_string()
            }
            ApiError::Report(_) => "Não foi possível gerar o relatório.".to_string(),
            ApiError::Template(_) => "Não foi possível montar a página.".to_string(),
            ApiError::Json(rejection) => format!("Pedido inválido: {}", rejection.body_text()),
            ApiError::Form(rejection) => format!("Formulário inválido: {}", rejection.body_text()),
        }
    }

    /// Form field to highlight, for validation failures.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ApiError::Orders(OrderServiceError::Validation(err)) => Some(err.field()),
            _ => None,
        }
    }

    fn log(&self) {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        let message = self.user_message();
        let body = match self.field() {
            Some(field) => ApiResponse::<(), String>::error_with_data(&message, field.to_string()),
            None => ApiResponse::<(), String>::error(&message),
        };
        (status, ResponseJson(body)).into_response()
    }
}

/// Same failures as [`ApiError`], answered with an HTML page.
#[derive(Debug)]
pub struct PageError(pub ApiError);

impl From<ApiError> for PageError {
    fn from(err: ApiError) -> Self {
        PageError(err)
    }
}

impl From<OrderServiceError> for PageError {
    fn from(err: OrderServiceError) -> Self {
        PageError(err.into())
    }
}

impl From<ReportError> for PageError {
    fn from(err: ReportError) -> Self {
        PageError(err.into())
    }
}

impl From<TemplateError> for PageError {
    fn from(err: TemplateError) -> Self {
        PageError(err.into())
    }
}

#[derive(Serialize)]
struct ErrorPage {
    status: u16,
    message: String,
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let PageError(err) = self;
        err.log();
        let status = err.status();
        let page = ErrorPage {
            status: status.as_u16(),
            message: err.user_message(),
        };
        match templates::render("error", &page) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(render_err) => {
                tracing::error!(error = %render_err, "Failed to render error page");
                (status, page.message).into_response()
            }
        }
    }
}
