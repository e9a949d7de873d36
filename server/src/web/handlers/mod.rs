// server/src/web/handlers/mod.rs

pub mod munchkin_handlers;
pub mod order_handlers;
