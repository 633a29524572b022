//! Database repository for orders.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::{
        order_items::OrderItem,
        orders::{Order, OrderCreateDBRequest, OrderDBResponse},
    },
};
use crate::types::{DEFAULT_ORDER_STATUS, OrderId};
use sqlx::{PgConnection, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing orders
#[derive(Debug, Clone)]
pub struct OrderFilter {
    pub skip: i64,
    pub limit: i64,
    pub status: Option<String>,
    pub customer_name: Option<String>, // Case-insensitive substring match
}

impl OrderFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            status: None,
            customer_name: None,
        }
    }

    pub fn with_status(mut self, status: String) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_customer(mut self, customer_name: String) -> Self {
        self.customer_name = Some(customer_name);
        self
    }
}

pub struct Orders<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Orders<'c> {
    type CreateRequest = OrderCreateDBRequest;
    type Response = OrderDBResponse;
    type Id = OrderId;
    type Filter = OrderFilter;

    #[instrument(skip(self, request), fields(customer_name = %request.customer_name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        // order_date falls back to the database clock so every default timestamp comes from one source
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (order_date, customer_name, customer_phone, customer_email, status, total_amount)
            VALUES (COALESCE($1, NOW()), $2, $3, $4, $5, COALESCE($6::DOUBLE PRECISION, 0))
            RETURNING *
            "#,
        )
        .bind(request.order_date)
        .bind(&request.customer_name)
        .bind(&request.customer_phone)
        .bind(&request.customer_email)
        .bind(request.status.as_deref().unwrap_or(DEFAULT_ORDER_STATUS))
        .bind(request.total_amount)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(order)
    }

    #[instrument(skip(self), fields(order_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(order)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<OrderId>) -> Result<HashMap<OrderId, OrderDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ANY($1)")
            .bind(ids.as_slice())
            .fetch_all(&mut *self.db)
            .await?;

        Ok(orders.into_iter().map(|o| (o.id, o)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM orders WHERE 1=1");

        if let Some(ref status) = filter.status {
            query.push(" AND status = ");
            query.push_bind(status.clone());
        }

        if let Some(ref customer_name) = filter.customer_name {
            query.push(" AND LOWER(customer_name) LIKE ");
            query.push_bind(format!("%{}%", customer_name.to_lowercase()));
        }

        query.push(" ORDER BY order_date DESC, id DESC LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let orders = query.build_query_as::<Order>().fetch_all(&mut *self.db).await?;

        Ok(orders)
    }
}

impl<'c> Orders<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Items belonging to an order, in insertion order
    #[instrument(skip(self), fields(order_id = id), err)]
    pub async fn items(&mut self, id: OrderId) -> Result<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
            .bind(id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(items)
    }
}
