//! Database repository for suppliers.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::{
        products::Product,
        suppliers::{Supplier, SupplierCreateDBRequest, SupplierDBResponse},
    },
};
use crate::types::SupplierId;
use sqlx::{PgConnection, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;

/// Filter for listing suppliers
#[derive(Debug, Clone)]
pub struct SupplierFilter {
    pub skip: i64,
    pub limit: i64,
    pub search: Option<String>, // Case-insensitive substring search on name and contact person
}

impl SupplierFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit, search: None }
    }

    pub fn with_search(mut self, search: String) -> Self {
        self.search = Some(search);
        self
    }
}

pub struct Suppliers<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Suppliers<'c> {
    type CreateRequest = SupplierCreateDBRequest;
    type Response = SupplierDBResponse;
    type Id = SupplierId;
    type Filter = SupplierFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, contact_person, phone, email, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.contact_person)
        .bind(&request.phone)
        .bind(&request.email)
        .bind(&request.address)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(supplier)
    }

    #[instrument(skip(self), fields(supplier_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(supplier)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<SupplierId>) -> Result<HashMap<SupplierId, SupplierDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let suppliers = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ANY($1)")
            .bind(ids.as_slice())
            .fetch_all(&mut *self.db)
            .await?;

        Ok(suppliers.into_iter().map(|s| (s.id, s)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM suppliers WHERE 1=1");

        if let Some(ref search) = filter.search {
            let search_pattern = format!("%{}%", search.to_lowercase());
            query.push(" AND (LOWER(name) LIKE ");
            query.push_bind(search_pattern.clone());
            query.push(" OR LOWER(COALESCE(contact_person, '')) LIKE ");
            query.push_bind(search_pattern);
            query.push(")");
        }

        query.push(" ORDER BY id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let suppliers = query.build_query_as::<Supplier>().fetch_all(&mut *self.db).await?;

        Ok(suppliers)
    }
}

impl<'c> Suppliers<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Products supplied by this supplier, oldest first
    #[instrument(skip(self), fields(supplier_id = id), err)]
    pub async fn products(&mut self, id: SupplierId) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE supplier_id = $1 ORDER BY id")
            .bind(id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::Products;
    use crate::db::models::products::ProductCreateDBRequest;
    use crate::test_utils::setup_schema;
    use sqlx::PgPool;

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_create_and_get_supplier(pool: PgPool) {
        setup_schema(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Suppliers::new(&mut conn);

        let request = SupplierCreateDBRequest::builder()
            .name("Trade")
            .contact_person("Ivan Ivanov")
            .phone("+79991234567")
            .email("supplier@example.com")
            .address("Moscow")
            .build();
        let created = repo.create(&request).await.unwrap();

        assert!(created.id > 0);
        assert_eq!(created.name, "Trade");
        assert_eq!(created.contact_person.as_deref(), Some("Ivan Ivanov"));

        let fetched = repo.get_by_id(created.id).await.unwrap().expect("supplier should exist");
        assert_eq!(fetched, created);

        assert!(repo.get_by_id(created.id + 1000).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_list_and_search_suppliers(pool: PgPool) {
        setup_schema(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Suppliers::new(&mut conn);

        for (name, contact) in [("Trade", "Ivanov"), ("Parts Ltd", "Sidorova"), ("Wholesale", "Petrov")] {
            repo.create(&SupplierCreateDBRequest::builder().name(name).contact_person(contact).build())
                .await
                .unwrap();
        }

        let all = repo.list(&SupplierFilter::new(0, 10)).await.unwrap();
        assert_eq!(all.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(), ["Trade", "Parts Ltd", "Wholesale"]);

        let page = repo.list(&SupplierFilter::new(1, 1)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "Parts Ltd");

        let found = repo.list(&SupplierFilter::new(0, 10).with_search("PETROV".to_string())).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Wholesale");
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_get_bulk_suppliers(pool: PgPool) {
        setup_schema(&pool).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Suppliers::new(&mut conn);

        let a = repo.create(&SupplierCreateDBRequest::builder().name("A").build()).await.unwrap();
        let b = repo.create(&SupplierCreateDBRequest::builder().name("B").build()).await.unwrap();

        let bulk = repo.get_bulk(vec![a.id, b.id, b.id + 1000]).await.unwrap();
        assert_eq!(bulk.len(), 2);
        assert_eq!(bulk[&a.id].name, "A");
        assert_eq!(bulk[&b.id].name, "B");

        assert!(repo.get_bulk(vec![]).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_supplier_products(pool: PgPool) {
        setup_schema(&pool).await;
        let mut conn = pool.acquire().await.unwrap();

        let supplier = Suppliers::new(&mut conn)
            .create(&SupplierCreateDBRequest::builder().name("Trade").build())
            .await
            .unwrap();

        {
            let mut products = Products::new(&mut conn);
            for name in ["Laptop", "Mouse"] {
                products
                    .create(&ProductCreateDBRequest::builder().name(name).price(10.0).supplier_id(supplier.id).build())
                    .await
                    .unwrap();
            }
            products
                .create(&ProductCreateDBRequest::builder().name("Unrelated").price(1.0).build())
                .await
                .unwrap();
        }

        let products = Suppliers::new(&mut conn).products(supplier.id).await.unwrap();
        assert_eq!(products.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), ["Laptop", "Mouse"]);
        assert!(products.iter().all(|p| p.supplier_id == Some(supplier.id)));
    }
}
