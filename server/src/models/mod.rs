// server/src/models/mod.rs

//! Contains data structures representing database entities and the catalog.

// Declare child modules for each model
pub mod munchkin;
pub mod order;
pub mod order_item;

// Re-export the model structs for convenient access
pub use munchkin::Munchkin;
pub use order::Order;
pub use order_item::OrderItem;
