// server/src/state.rs
use crate::config::AppConfig;
use crate::service::OrderService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub service: OrderService,
  pub config: Arc<AppConfig>, // Share loaded config
}
