use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use hungryharmony_rs::{
    auth::TokenService,
    cors_layer, create_app,
    handlers::{ApiState, AuthState},
    init_observability,
    repositories::DocumentStore,
    services::{FoodService, OrderService, UserService},
    shutdown_observability, Config, Metrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments set the environment directly
    dotenv::dotenv().ok();

    let config = Config::from_environment().context("failed to load configuration")?;
    println!("Configuration loaded successfully");

    init_observability(
        &config.observability.service_name,
        &config.observability.service_version,
        config.observability.otlp_endpoint.as_deref(),
        &config.observability.log_level,
        config.observability.enable_json_logging,
    )?;

    info!("Starting hungryharmony-rs service");
    info!(
        "Service: {} v{}",
        config.observability.service_name, config.observability.service_version
    );

    let metrics = Arc::new(Metrics::new()?);
    info!("Metrics initialized successfully");

    let store = DocumentStore::connect(&config.database, metrics.clone())
        .await
        .context("failed to create MongoDB client")?;

    match store.ping().await {
        Ok(()) => info!(
            database = %config.database.name,
            "Pinged your deployment. You successfully connected to MongoDB!"
        ),
        Err(e) => warn!(error = %e, "MongoDB ping failed, continuing without a verified connection"),
    }

    let api_state = ApiState {
        food_service: Arc::new(FoodService::new(store.foods())),
        order_service: Arc::new(OrderService::new(store.orders())),
        user_service: Arc::new(UserService::new(store.users())),
        metrics: metrics.clone(),
    };
    let auth_state = AuthState {
        tokens: Arc::new(TokenService::new(
            &config.auth.secret,
            config.auth.token_ttl(),
        )),
        metrics: metrics.clone(),
    };
    info!("Services initialized successfully");

    let app = create_app(metrics, api_state, auth_state, cors_layer(&config.cors));

    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .context("invalid HOST address")?,
        config.server.port,
    );
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    drop(store);
    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
    shutdown_observability().await;
}
