//! HTML pages: the order form, the order table and the edit page.

use axum::{
    Form, Router,
    extract::{Path, Query, State, rejection::FormRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use deployment::Deployment;
use serde::Deserialize;
use services::services::{
    order_form::OrderForm,
    orders::{OrderService, OrderServiceError},
};

use crate::{
    DeploymentImpl,
    error::{ApiError, PageError},
    templates::{self, EditPage, FormView, IndexPage},
};

const SAVE_LABEL: &str = "Salvar Pedido";
const UPDATE_LABEL: &str = "Atualizar Pedido";

/// Outcome of the previous redirect, carried in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct Flash {
    pub saved: Option<i64>,
    pub deleted: Option<i64>,
}

impl Flash {
    async fn message(&self, orders: &OrderService) -> Result<Option<String>, OrderServiceError> {
        if let Some(id) = self.saved {
            return match orders.get(id).await {
                Ok(order) => Ok(Some(format!(
                    "Pedido salvo com sucesso! Entrega prevista para {}.",
                    order.delivery_date
                ))),
                Err(OrderServiceError::NotFound(_)) => Ok(None),
                Err(e) => Err(e),
            };
        }
        Ok(self.deleted.map(|id| format!("Pedido {id} excluído.")))
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn index_page(
    deployment: &DeploymentImpl,
    form: FormView,
    flash: Option<String>,
) -> Result<Html<String>, PageError> {
    let page = IndexPage {
        form,
        orders: deployment.orders().list().await?,
        flash,
        report_file: deployment.reports().file_name(),
    };
    Ok(Html(templates::render("index", &page)?))
}

/// GET /
pub async fn index(
    State(deployment): State<DeploymentImpl>,
    Query(flash): Query<Flash>,
) -> Result<Html<String>, PageError> {
    let message = flash.message(deployment.orders()).await?;
    let form = FormView::new("/orders", SAVE_LABEL, &OrderForm::default(), today());
    index_page(&deployment, form, message).await
}

/// POST /orders
/// Save a new order, or show the form again with the first problem found.
pub async fn create_order(
    State(deployment): State<DeploymentImpl>,
    form: Result<Form<OrderForm>, FormRejection>,
) -> Result<Response, PageError> {
    let Form(form) = form.map_err(ApiError::from)?;
    match deployment.orders().create(&form).await {
        Ok(order) => Ok(Redirect::to(&format!("/?saved={}", order.id)).into_response()),
        Err(OrderServiceError::Validation(err)) => {
            let view = FormView::new("/orders", SAVE_LABEL, &form, today())
                .with_error(err.to_string(), Some(err.field()));
            let page = index_page(&deployment, view, None).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /orders/{id}/edit
pub async fn edit_order(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<Html<String>, PageError> {
    let order = deployment.orders().get(id).await?;
    let form = FormView::new(
        format!("/orders/{id}"),
        UPDATE_LABEL,
        &OrderForm::from(&order),
        order.order_date,
    );
    Ok(Html(templates::render("edit", &EditPage { order, form })?))
}

/// POST /orders/{id}
/// Replace every field of the order with the submitted values.
pub async fn update_order(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
    form: Result<Form<OrderForm>, FormRejection>,
) -> Result<Response, PageError> {
    let Form(form) = form.map_err(ApiError::from)?;
    match deployment.orders().update(id, &form).await {
        Ok(order) => Ok(Redirect::to(&format!("/?saved={}", order.id)).into_response()),
        Err(OrderServiceError::Validation(err)) => {
            let order = deployment.orders().get(id).await?;
            let view = FormView::new(format!("/orders/{id}"), UPDATE_LABEL, &form, order.order_date)
                .with_error(err.to_string(), Some(err.field()));
            let html = templates::render("edit", &EditPage { order, form: view })?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /orders/{id}/delete
/// Deleting an id that no longer exists still returns to the list.
pub async fn delete_order(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<i64>,
) -> Result<Redirect, PageError> {
    deployment.orders().delete(id).await?;
    Ok(Redirect::to(&format!("/?deleted={id}")))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route("/", get(index))
        .route("/orders", post(create_order))
        .route("/orders/{id}", post(update_order))
        .route("/orders/{id}/edit", get(edit_order))
        .route("/orders/{id}/delete", post(delete_order))
}
