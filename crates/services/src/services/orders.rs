//! Order operations behind the form and the API.

use chrono::{Local, NaiveDate};
use db::models::order::Order;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

use super::order_form::{FormError, OrderForm};

#[derive(Debug, Error)]
pub enum OrderServiceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Validation(#[from] FormError),
    #[error("order {0} not found")]
    NotFound(i64),
}

#[derive(Clone)]
pub struct OrderService {
    pool: SqlitePool,
}

impl OrderService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Order>, OrderServiceError> {
        let orders = Order::find_all(&self.pool).await?;
        debug!(count = orders.len(), "Listed orders");
        Ok(orders)
    }

    pub async fn get(&self, id: i64) -> Result<Order, OrderServiceError> {
        Order::find_by_id(&self.pool, id)
            .await?
            .ok_or(OrderServiceError::NotFound(id))
    }

    /// Save a new order dated today. Resubmitting the same form stores a
    /// second row.
    pub async fn create(&self, form: &OrderForm) -> Result<Order, OrderServiceError> {
        self.create_on(form, Local::now().date_naive()).await
    }

    /// Save a new order with an explicit order date.
    pub async fn create_on(
        &self,
        form: &OrderForm,
        order_date: NaiveDate,
    ) -> Result<Order, OrderServiceError> {
        let data = form.validate(order_date)?;
        let id = Order::create(&self.pool, &data).await?;

        info!(
            order_id = id,
            client = %data.client,
            delivery_date = %data.delivery_date,
            "Order saved"
        );
        Ok(data.into_order(id))
    }

    /// Replace every field of order `id` with the form values. The stored
    /// order date is kept and the delivery date recomputed from it.
    pub async fn update(&self, id: i64, form: &OrderForm) -> Result<Order, OrderServiceError> {
        let existing = self.get(id).await?;
        let data = form.validate(existing.order_date)?;

        if Order::update(&self.pool, id, &data).await? == 0 {
            // Deleted between the read and the write.
            return Err(OrderServiceError::NotFound(id));
        }

        info!(
            order_id = id,
            lead_time_days = data.lead_time_days,
            delivery_date = %data.delivery_date,
            "Order updated"
        );
        Ok(data.into_order(id))
    }

    /// Delete order `id`; returns whether a row existed.
    pub async fn delete(&self, id: i64) -> Result<bool, OrderServiceError> {
        let removed = Order::delete(&self.pool, id).await? > 0;
        if removed {
            info!(order_id = id, "Order deleted");
        } else {
            debug!(order_id = id, "Delete of missing order ignored");
        }
        Ok(removed)
    }

    pub async fn count(&self) -> Result<i64, OrderServiceError> {
        Ok(Order::count(&self.pool).await?)
    }
}
