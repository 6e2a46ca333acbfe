use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tracing::warn;

/// Columns of `pedidos` aliased to the field names of [`Order`]. Older files
/// may hold NULL text columns, which read back as empty strings.
const SELECT_ORDERS: &str = r#"SELECT
    id,
    COALESCE(cliente, '')               AS client,
    COALESCE(tema, '')                  AS theme,
    COALESCE(moldura, '')               AS frame_option,
    COALESCE(tamanho, '')               AS size,
    COALESCE(tamanho_personalizado, '') AS custom_size,
    data_pedido                         AS order_date,
    COALESCE(tempo_entrega, 0)          AS lead_time_days,
    data_entrega                        AS delivery_date,
    COALESCE(condicoes_pagamento, '')   AS payment_terms,
    COALESCE(forma_pagamento, '')       AS payment_method
FROM pedidos"#;

/// A stored commission. Dropdown-backed fields are kept as the text that was
/// saved; membership in the current option lists is checked by the form, not
/// here.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: i64,
    pub client: String,
    pub theme: String,
    pub frame_option: String,
    pub size: String,
    pub custom_size: String,
    pub order_date: NaiveDate,
    pub lead_time_days: i64,
    pub delivery_date: NaiveDate, // snapshot of order_date + lead_time_days at save time
    pub payment_terms: String,
    pub payment_method: String,
}

/// A row as read. Files written by older versions may lack either date.
#[derive(Debug, FromRow)]
struct OrderRow {
    id: i64,
    client: String,
    theme: String,
    frame_option: String,
    size: String,
    custom_size: String,
    order_date: Option<NaiveDate>,
    lead_time_days: i64,
    delivery_date: Option<NaiveDate>,
    payment_terms: String,
    payment_method: String,
}

impl OrderRow {
    /// `None`, with a warning, when a date is missing.
    fn into_order(self) -> Option<Order> {
        let (Some(order_date), Some(delivery_date)) = (self.order_date, self.delivery_date)
        else {
            warn!(order_id = self.id, "Skipping order without order or delivery date");
            return None;
        };
        Some(Order {
            id: self.id,
            client: self.client,
            theme: self.theme,
            frame_option: self.frame_option,
            size: self.size,
            custom_size: self.custom_size,
            order_date,
            lead_time_days: self.lead_time_days,
            delivery_date,
            payment_terms: self.payment_terms,
            payment_method: self.payment_method,
        })
    }
}

/// Every column except the id; used for both insert and full-row update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateOrder {
    pub client: String,
    pub theme: String,
    pub frame_option: String,
    pub size: String,
    pub custom_size: String,
    pub order_date: NaiveDate,
    pub lead_time_days: i64,
    pub delivery_date: NaiveDate,
    pub payment_terms: String,
    pub payment_method: String,
}

impl CreateOrder {
    /// The stored row once `id` has been assigned.
    pub fn into_order(self, id: i64) -> Order {
        Order {
            id,
            client: self.client,
            theme: self.theme,
            frame_option: self.frame_option,
            size: self.size,
            custom_size: self.custom_size,
            order_date: self.order_date,
            lead_time_days: self.lead_time_days,
            delivery_date: self.delivery_date,
            payment_terms: self.payment_terms,
            payment_method: self.payment_method,
        }
    }
}

impl Order {
    /// Every order in id order. Rows missing a date are left out.
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_ORDERS} ORDER BY id"))
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().filter_map(OrderRow::into_order).collect())
    }

    /// `None` for a missing id and for a row missing a date.
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_ORDERS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.and_then(OrderRow::into_order))
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM pedidos")
            .fetch_one(pool)
            .await
    }

    /// Insert a new row and return its id.
    pub async fn create(pool: &SqlitePool, data: &CreateOrder) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"INSERT INTO pedidos (
                   cliente, tema, moldura, tamanho, tamanho_personalizado,
                   data_pedido, tempo_entrega, data_entrega,
                   condicoes_pagamento, forma_pagamento
               )
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
        )
        .bind(&data.client)
        .bind(&data.theme)
        .bind(&data.frame_option)
        .bind(&data.size)
        .bind(&data.custom_size)
        .bind(data.order_date)
        .bind(data.lead_time_days)
        .bind(data.delivery_date)
        .bind(&data.payment_terms)
        .bind(&data.payment_method)
        .execute(pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Overwrite every column of row `id`. Returns the number of rows
    /// touched, 0 when the id does not exist.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &CreateOrder,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE pedidos
               SET cliente = $2, tema = $3, moldura = $4, tamanho = $5,
                   tamanho_personalizado = $6, data_pedido = $7,
                   tempo_entrega = $8, data_entrega = $9,
                   condicoes_pagamento = $10, forma_pagamento = $11
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(&data.client)
        .bind(&data.theme)
        .bind(&data.frame_option)
        .bind(&data.size)
        .bind(&data.custom_size)
        .bind(data.order_date)
        .bind(data.lead_time_days)
        .bind(data.delivery_date)
        .bind(&data.payment_terms)
        .bind(&data.payment_method)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete row `id`. A missing id is not an error; it affects 0 rows.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pedidos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
