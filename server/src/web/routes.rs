// server/src/web/routes.rs

use actix_web::web;

// Simple health check handler. In a real deployment this might also probe
// the database and the queue.
async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// This function is called in `main.rs` to configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    // Health Check Route
    .route("/health", web::get().to(health_check_handler))
    // Static catalog
    .route(
      "/munchkins",
      web::get().to(crate::web::handlers::munchkin_handlers::list_munchkins_handler),
    )
    // Order submission and listing
    .route(
      "/orders",
      web::post().to(crate::web::handlers::order_handlers::create_order_handler),
    )
    .route(
      "/orders",
      web::get().to(crate::web::handlers::order_handlers::list_orders_handler),
    )
    // Status polling by task handle
    .route(
      "/order_status/{task_id}",
      web::get().to(crate::web::handlers::order_handlers::order_status_handler),
    )
    // Claiming (deleting) a handed-over order
    .route(
      "/claim_order/{order_id}",
      web::delete().to(crate::web::handlers::order_handlers::claim_order_handler),
    );
}
