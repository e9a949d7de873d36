// server/src/main.rs

use munchkin_stand::config::AppConfig;
use munchkin_stand::service::OrderService;
use munchkin_stand::state::AppState;
use munchkin_stand::store::{self, OrderStore};
use munchkin_stand::web::configure_app_routes;

use actix_web::{web as actix_data, App, HttpServer}; // Renamed web to actix_data
use backburner::Broker;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing

// Main function
#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // Initialize tracing subscriber for logging
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO) // Default level
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  tracing::info!("Starting munchkin stand API server...");

  // Load application configuration
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg), // Arc the config for sharing
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      panic!("Configuration error: {}", e);
    }
  };

  // Initialize the order database
  let db_pool = match store::connect_pool(&app_config.database_url).await {
    Ok(pool) => {
      tracing::info!("Successfully connected to the order database.");
      pool
    }
    Err(e) => {
      tracing::error!(error = %e, "Failed to connect to the order database.");
      panic!("Database connection error: {}", e);
    }
  };
  let order_store = OrderStore::new(db_pool);
  if let Err(e) = order_store.init_schema().await {
    tracing::error!(error = %e, "Failed to initialize the order schema.");
    panic!("Database schema error: {}", e);
  }

  // Initialize the task queue broker (this process only enqueues and polls;
  // the worker binary consumes)
  let broker = match Broker::connect(&app_config.queue_url).await {
    Ok(broker) => broker,
    Err(e) => {
      tracing::error!(error = %e, "Failed to connect to the queue database.");
      panic!("Queue connection error: {}", e);
    }
  };
  if let Err(e) = broker.startup().await {
    tracing::error!(error = %e, "Failed to initialize the queue schema.");
    panic!("Queue schema error: {}", e);
  }
  tracing::info!("Broker started.");

  // Create AppState
  let app_state = AppState {
    service: OrderService::new(order_store, broker.clone()),
    config: app_config.clone(), // Clone Arc for AppState
  };

  // Configure and Start Actix Web Server
  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await?;

  tracing::info!("Shutting down broker.");
  broker.shutdown().await;
  Ok(())
}
