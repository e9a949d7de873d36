// server/src/bin/worker.rs

//! The background preparation process: pulls tasks from the durable queue
//! and executes them. Run one or more of these alongside the API server;
//! they share nothing but the two databases.

use munchkin_stand::config::AppConfig;
use munchkin_stand::service::OrderService;
use munchkin_stand::store::{self, OrderStore};
use munchkin_stand::tasks::OrderTaskRouter;

use backburner::{shutdown_channel, Broker, Worker, WorkerOptions};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting munchkin stand worker...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => cfg,
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      panic!("Configuration error: {}", e);
    }
  };

  let db_pool = match store::connect_pool(&app_config.database_url).await {
    Ok(pool) => pool,
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

  // Repair path: orders persisted without a task handle get re-enqueued
  // before regular consumption begins.
  let service = OrderService::new(order_store, broker.clone());
  match service.reenqueue_stranded().await {
    Ok(0) => {}
    Ok(n) => tracing::info!("Re-enqueued {} stranded orders.", n),
    Err(e) => tracing::error!(error = %e, "Failed to re-enqueue stranded orders."),
  }

  let options = WorkerOptions {
    poll_interval: app_config.worker_poll_interval,
    ..WorkerOptions::default()
  };
  let router = OrderTaskRouter::new(app_config.prep_time_unit);

  let (shutdown_tx, shutdown_rx) = shutdown_channel();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      tracing::info!("Ctrl-C received; stopping worker.");
      let _ = shutdown_tx.send(true);
    }
  });

  Worker::new(broker.clone(), router, options, shutdown_rx).run().await;

  tracing::info!("Shutting down broker.");
  broker.shutdown().await;
  Ok(())
}
