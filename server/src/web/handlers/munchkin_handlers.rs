// server/src/web/handlers/munchkin_handlers.rs

use actix_web::HttpResponse;
use tracing::instrument;

use crate::catalog;
use crate::errors::AppError;

#[instrument(name = "handler::list_munchkins")]
pub async fn list_munchkins_handler() -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(catalog::munchkins()))
}
