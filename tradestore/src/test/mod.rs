//! End-to-end scenarios across configuration, bootstrap, sessions and projections.

use crate::db::DatabaseConnection;
use crate::db::errors::DbError;
use crate::db::handlers::Repository;
use crate::db::models::Projection;
use crate::errors::Error;
use crate::types::mask_password;
use crate::test_utils::{create_test_config, sample_order, sample_order_item, sample_product, sample_supplier};
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgPoolOptions;

/// Connection string for the per-test database, keeping the credentials from DATABASE_URL
fn test_database_url(options: &PgConnectOptions) -> String {
    let base = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for database tests");
    let mut url = url::Url::parse(&base).expect("DATABASE_URL must be a URL");
    url.set_path(&format!("/{}", options.get_database().expect("test database has a name")));
    url.to_string()
}

#[sqlx::test(migrations = false)]
#[test_log::test]
async fn test_scenario_round_trips_through_projections(pool: PgPool) {
    let db = DatabaseConnection::from_pool(pool);
    db.create_tables().await.unwrap();

    let (supplier, product, order, item) = db
        .with_session(|session| {
            Box::pin(async move {
                let supplier = session.suppliers().create(&sample_supplier()).await?;
                let product = session.products().create(&sample_product(supplier.id)).await?;
                let order = session.orders().create(&sample_order()).await?;
                let item = session.order_items().create(&sample_order_item(order.id, product.id)).await?;
                Ok::<_, Error>((supplier, product, order, item))
            })
        })
        .await
        .unwrap();

    // Every field of every projection is checked against the request it was created from
    let supplier_request = sample_supplier();
    let expected_supplier = json!({
        "id": supplier.id,
        "name": supplier_request.name,
        "contact_person": supplier_request.contact_person,
        "phone": supplier_request.phone,
        "email": supplier_request.email,
        "address": supplier_request.address,
    });

    let product_request = sample_product(supplier.id);
    let expected_product = json!({
        "id": product.id,
        "name": product_request.name,
        "description": product_request.description,
        "price": product_request.price,
        "quantity": product_request.quantity.unwrap(),
        "supplier_id": supplier.id,
    });

    // order_date is assigned by the database, so it is the one value taken from the stored row
    let order_request = sample_order();
    let stored_order_date = order.to_dict()["order_date"].clone();
    assert!(stored_order_date.is_string(), "order_date should be rendered: {stored_order_date}");
    let expected_order = json!({
        "id": order.id,
        "order_date": stored_order_date,
        "customer_name": order_request.customer_name,
        "customer_phone": order_request.customer_phone,
        "customer_email": order_request.customer_email,
        "status": order_request.status.unwrap(),
        "total_amount": order_request.total_amount.unwrap(),
    });

    let item_request = sample_order_item(order.id, product.id);
    let expected_item = json!({
        "id": item.id,
        "order_id": order.id,
        "product_id": product.id,
        "quantity": item_request.quantity,
        "price": item_request.price,
    });

    assert_eq!(Value::Object(supplier.to_dict()), expected_supplier);
    assert_eq!(Value::Object(product.to_dict()), expected_product);
    assert_eq!(Value::Object(order.to_dict()), expected_order);
    assert_eq!(Value::Object(item.to_dict()), expected_item);

    let ids = (supplier.id, product.id, order.id, item.id);
    let (supplier, product, order, item) = db
        .with_session(move |session| {
            Box::pin(async move {
                let supplier = session.suppliers().get_by_id(ids.0).await?;
                let product = session.products().get_by_id(ids.1).await?;
                let order = session.orders().get_by_id(ids.2).await?;
                let item = session.order_items().get_by_id(ids.3).await?;
                Ok::<_, Error>((supplier, product, order, item))
            })
        })
        .await
        .unwrap();

    assert_eq!(Value::Object(supplier.unwrap().to_dict()), expected_supplier);
    assert_eq!(Value::Object(product.unwrap().to_dict()), expected_product);
    assert_eq!(Value::Object(order.unwrap().to_dict()), expected_order);
    assert_eq!(Value::Object(item.unwrap().to_dict()), expected_item);
}

#[sqlx::test(migrations = false)]
#[test_log::test]
async fn test_item_price_is_a_snapshot(pool: PgPool) {
    let db = DatabaseConnection::from_pool(pool);
    db.create_tables().await.unwrap();

    let (product_id, item_id) = db
        .with_session(|session| {
            Box::pin(async move {
                let supplier = session.suppliers().create(&sample_supplier()).await?;
                let product = session.products().create(&sample_product(supplier.id)).await?;
                let order = session.orders().create(&sample_order()).await?;
                let item = session.order_items().create(&sample_order_item(order.id, product.id)).await?;
                Ok::<_, Error>((product.id, item.id))
            })
        })
        .await
        .unwrap();

    // Repricing happens outside the repositories, which never update rows
    sqlx::query("UPDATE products SET price = 42000 WHERE id = $1")
        .bind(product_id)
        .execute(db.pool())
        .await
        .unwrap();

    let item = db
        .with_session(move |session| Box::pin(async move { Ok::<_, Error>(session.order_items().get_by_id(item_id).await?) }))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.price, 50000.0);
}

#[sqlx::test(migrations = false)]
#[test_log::test]
async fn test_item_for_missing_product_leaves_storage_unchanged(pool: PgPool) {
    let db = DatabaseConnection::from_pool(pool);
    db.create_tables().await.unwrap();

    let err = db
        .with_session(|session| {
            Box::pin(async move {
                let order = session.orders().create(&sample_order()).await?;
                session.order_items().create(&sample_order_item(order.id, 404)).await?;
                Ok::<_, Error>(())
            })
        })
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::Database(DbError::ForeignKeyViolation { .. })),
        "unexpected error: {err:?}"
    );

    for table in ["suppliers", "products", "orders", "order_items"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0, "{table} should be empty");
    }
}

#[sqlx::test(migrations = false)]
#[test_log::test]
async fn test_bootstrap_from_config(_pool_options: PgPoolOptions, connect_options: PgConnectOptions) {
    let url = test_database_url(&connect_options);
    let mut config = create_test_config(&url);
    config.database.create_if_missing = true;

    let db = crate::bootstrap(&config).await.unwrap();
    assert_eq!(db.url(), mask_password(&url));

    assert_eq!(db.create_tables().await.unwrap().len(), 4);
    assert!(db.create_tables().await.unwrap().is_empty());

    db.close().await;
}
