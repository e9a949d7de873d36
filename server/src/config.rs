// server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)] // Clone is useful if parts of config are passed around
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Order database (sqlx SQLite URL).
  pub database_url: String,
  /// Queue database; deliberately separate from the order database so the
  /// queue's durability is independent of the store's.
  pub queue_url: String,

  /// One abstract preparation "time unit". The catalog's wait times are
  /// multiples of this. Production uses one second; tests shrink it so
  /// end-to-end runs stay fast.
  pub prep_time_unit: Duration,
  /// How often an idle worker re-checks the queue.
  pub worker_poll_interval: Duration,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| env::var(var_name);

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8000".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL").unwrap_or_else(|_| "sqlite://orders.db".to_string());
    let queue_url = get_env("QUEUE_URL").unwrap_or_else(|_| "sqlite://queue.db".to_string());

    let prep_time_unit_ms = get_env("PREP_TIME_UNIT_MS")
      .unwrap_or_else(|_| "1000".to_string())
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid PREP_TIME_UNIT_MS: {}", e)))?;
    let worker_poll_interval_ms = get_env("WORKER_POLL_INTERVAL_MS")
      .unwrap_or_else(|_| "250".to_string())
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid WORKER_POLL_INTERVAL_MS: {}", e)))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      queue_url,
      prep_time_unit: Duration::from_millis(prep_time_unit_ms),
      worker_poll_interval: Duration::from_millis(worker_poll_interval_ms),
    })
  }
}
