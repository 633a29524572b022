//! Database repository for order items.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::order_items::{OrderItem, OrderItemCreateDBRequest, OrderItemDBResponse},
};
use crate::types::{OrderId, OrderItemId, ProductId};
use sqlx::{PgConnection, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing order items
#[derive(Debug, Clone)]
pub struct OrderItemFilter {
    pub skip: i64,
    pub limit: i64,
    pub order_id: Option<OrderId>,
    pub product_id: Option<ProductId>,
}

impl OrderItemFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            order_id: None,
            product_id: None,
        }
    }

    pub fn with_order(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn with_product(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }
}

pub struct OrderItems<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for OrderItems<'c> {
    type CreateRequest = OrderItemCreateDBRequest;
    type Response = OrderItemDBResponse;
    type Id = OrderItemId;
    type Filter = OrderItemFilter;

    /// Foreign keys are deferred, so a dangling `order_id` or `product_id` is only reported when
    /// the enclosing transaction commits.
    #[instrument(skip(self, request), fields(order_id = request.order_id, product_id = request.product_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, price)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request.order_id)
        .bind(request.product_id)
        .bind(request.quantity)
        .bind(request.price)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(item)
    }

    #[instrument(skip(self), fields(order_item_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let item = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(item)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<OrderItemId>) -> Result<HashMap<OrderItemId, OrderItemDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let items = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE id = ANY($1)")
            .bind(ids.as_slice())
            .fetch_all(&mut *self.db)
            .await?;

        Ok(items.into_iter().map(|i| (i.id, i)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM order_items WHERE 1=1");

        if let Some(order_id) = filter.order_id {
            query.push(" AND order_id = ");
            query.push_bind(order_id);
        }

        if let Some(product_id) = filter.product_id {
            query.push(" AND product_id = ");
            query.push_bind(product_id);
        }

        query.push(" ORDER BY id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let items = query.build_query_as::<OrderItem>().fetch_all(&mut *self.db).await?;

        Ok(items)
    }
}

impl<'c> OrderItems<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}
