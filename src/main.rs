use localmart::backend::{InMemoryAuth, InMemoryBackend};
use localmart::cart::local::MemoryKv;
use localmart::cart::models::ProductSnapshot;
use localmart::router::{create_app_router, AppState};
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // In-memory platform stand-in with a small demo catalog
    let backend = Arc::new(InMemoryBackend::new());
    seed_demo_catalog(&backend);

    let state = Arc::new(AppState::new(
        backend.clone(),
        backend,
        Arc::new(InMemoryAuth::new()),
        Arc::new(MemoryKv::new()),
    ));

    // Build application router with all routes and middleware
    let app = create_app_router(state);

    // Configure the server address
    let port = std::env::var("LOCALMART_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "server running");

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind server address");
    axum::serve(listener, app).await.expect("server error");
}

fn seed_demo_catalog(backend: &InMemoryBackend) {
    let products = [
        ("apples-1kg", "green-grocer", "Apples 1kg", 120, 20),
        ("bread-loaf", "corner-bakery", "Sourdough Loaf", 80, 15),
        ("milk-1l", "green-grocer", "Milk 1L", 60, 20),
    ];
    for (product_id, store_id, name, price, delivery) in products {
        backend.put_product(ProductSnapshot {
            product_id: product_id.into(),
            store_id: store_id.into(),
            name: name.to_string(),
            unit_price: Decimal::from(price),
            delivery_charge: Decimal::from(delivery),
        });
    }
}
