use clap::Parser;
use serde_json::Value;
use tradestore::db::handlers::Repository;
use tradestore::db::models::{
    Projection, order_items::OrderItemCreateDBRequest, orders::OrderCreateDBRequest, products::ProductCreateDBRequest,
    suppliers::SupplierCreateDBRequest,
};
use tradestore::{Config, DatabaseConnection, Error, telemetry};

/// Write one supplier, product, order and order item in a single session and return their
/// projections, labelled.
async fn write_demo(db: &DatabaseConnection) -> Result<Vec<(&'static str, Value)>, Error> {
    db.with_session(|session| {
        Box::pin(async move {
            let supplier = session
                .suppliers()
                .create(
                    &SupplierCreateDBRequest::builder()
                        .name("Trade")
                        .contact_person("Ivan Ivanov")
                        .phone("+79991234567")
                        .email("supplier@example.com")
                        .address("Moscow")
                        .build(),
                )
                .await?;

            let product = session
                .products()
                .create(
                    &ProductCreateDBRequest::builder()
                        .name("Laptop")
                        .description("Gaming laptop")
                        .price(50000.0)
                        .quantity(10)
                        .supplier_id(supplier.id)
                        .build(),
                )
                .await?;

            let order = session
                .orders()
                .create(
                    &OrderCreateDBRequest::builder()
                        .customer_name("P. Petrov")
                        .customer_phone("+79998765432")
                        .customer_email("customer@example.com")
                        .status("processing")
                        .total_amount(50000.0)
                        .build(),
                )
                .await?;

            // Price is copied from the product as it is now
            let item = session
                .order_items()
                .create(
                    &OrderItemCreateDBRequest::builder()
                        .order_id(order.id)
                        .product_id(product.id)
                        .quantity(1)
                        .price(product.price)
                        .build(),
                )
                .await?;

            Ok::<_, Error>(vec![
                ("supplier", Value::Object(supplier.to_dict())),
                ("product", Value::Object(product.to_dict())),
                ("order", Value::Object(order.to_dict())),
                ("order_item", Value::Object(item.to_dict())),
            ])
        })
    })
    .await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args = tradestore::config::Args::parse();

    // Load configuration
    let config = Config::load(&args)?;

    // If --validate flag is set, exit successfully after config validation
    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    telemetry::init_telemetry()?;

    tracing::debug!("{:?}", args);

    let db = tradestore::bootstrap(&config).await?;
    db.create_tables().await?;

    for (label, projection) in write_demo(&db).await? {
        println!("{label}: {projection}");
    }

    db.close().await;
    Ok(())
}
