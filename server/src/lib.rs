// server/src/lib.rs

//! Munchkin Stand: an order-taking service for a small food stand.
//!
//! Customers submit orders of menu items ("munchkins"); the service persists
//! each order, enqueues asynchronous preparation work on a durable queue, and
//! exposes polling endpoints so a client can observe when the order becomes
//! ready. HTTP serving and background preparation run as separate processes
//! (`munchkin-stand-server` and `munchkin-stand-worker`) that communicate
//! only through the order database and the queue.

pub mod catalog;
pub mod config;
pub mod errors;
pub mod models;
pub mod service;
pub mod state;
pub mod store;
pub mod tasks;
pub mod web;
