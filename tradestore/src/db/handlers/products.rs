//! Database repository for products.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::{
        order_items::OrderItem,
        products::{Product, ProductCreateDBRequest, ProductDBResponse},
        suppliers::Supplier,
    },
};
use crate::types::{ProductId, SupplierId};
use sqlx::{PgConnection, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing products
#[derive(Debug, Clone)]
pub struct ProductFilter {
    pub skip: i64,
    pub limit: i64,
    pub supplier_id: Option<SupplierId>,
    pub search: Option<String>, // Case-insensitive substring search on name and description
}

impl ProductFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            supplier_id: None,
            search: None,
        }
    }

    pub fn with_supplier(mut self, supplier_id: SupplierId) -> Self {
        self.supplier_id = Some(supplier_id);
        self
    }

    pub fn with_search(mut self, search: String) -> Self {
        self.search = Some(search);
        self
    }
}

pub struct Products<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Products<'c> {
    type CreateRequest = ProductCreateDBRequest;
    type Response = ProductDBResponse;
    type Id = ProductId;
    type Filter = ProductFilter;

    #[instrument(skip(self, request), fields(name = %request.name, supplier_id = ?request.supplier_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, description, price, quantity, supplier_id)
            VALUES ($1, $2, $3, COALESCE($4, 0), $5)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.price)
        .bind(request.quantity)
        .bind(request.supplier_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(product)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<ProductId>) -> Result<HashMap<ProductId, ProductDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
            .bind(ids.as_slice())
            .fetch_all(&mut *self.db)
            .await?;

        Ok(products.into_iter().map(|p| (p.id, p)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM products WHERE 1=1");

        if let Some(supplier_id) = filter.supplier_id {
            query.push(" AND supplier_id = ");
            query.push_bind(supplier_id);
        }

        if let Some(ref search) = filter.search {
            let search_pattern = format!("%{}%", search.to_lowercase());
            query.push(" AND (LOWER(name) LIKE ");
            query.push_bind(search_pattern.clone());
            query.push(" OR LOWER(COALESCE(description, '')) LIKE ");
            query.push_bind(search_pattern);
            query.push(")");
        }

        query.push(" ORDER BY id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let products = query.build_query_as::<Product>().fetch_all(&mut *self.db).await?;

        Ok(products)
    }
}

impl<'c> Products<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// The supplier of a product, if it has one
    #[instrument(skip(self), fields(product_id = id), err)]
    pub async fn supplier(&mut self, id: ProductId) -> Result<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT s.* FROM suppliers s
            INNER JOIN products p ON p.supplier_id = s.id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(supplier)
    }

    /// Order items that reference this product
    #[instrument(skip(self), fields(product_id = id), err)]
    pub async fn order_items(&mut self, id: ProductId) -> Result<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE product_id = $1 ORDER BY id")
            .bind(id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(items)
    }
}
