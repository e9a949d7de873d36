// server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::Order;
use crate::state::AppState;

#[instrument(name = "handler::create_order", skip(app_state, body), fields(customer_name = %body.customer_name))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  body: web::Json<Order>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.service.submit_order(body.into_inner()).await?;

  info!(order_id = ?order.id, "Order created.");
  Ok(HttpResponse::Ok().json(json!({
      "type": "success",
      "message": "Order created successfully!",
      "order": order
  })))
}

#[instrument(name = "handler::list_orders", skip(app_state))]
pub async fn list_orders_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let orders = app_state.service.list_orders().await?;
  info!("Fetched {} orders.", orders.len());
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::order_status", skip(app_state, path), fields(task_id = %path.as_ref()))]
pub async fn order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let task_id = path.into_inner();
  let status = app_state.service.poll_status(&task_id).await?;
  Ok(HttpResponse::Ok().json(status))
}

#[instrument(name = "handler::claim_order", skip(app_state, path), fields(order_id = %path.as_ref()))]
pub async fn claim_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  app_state.service.claim_order(order_id).await?;

  Ok(HttpResponse::Ok().json(json!({
      "type": "success",
      "message": "Order claimed successfully!"
  })))
}
