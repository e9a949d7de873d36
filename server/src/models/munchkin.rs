// server/src/models/munchkin.rs

use serde::Serialize;

/// A catalog entry: a menu item with its unit price and the preparation wait
/// time (in abstract time units, seconds in production) for a single piece.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Munchkin {
  pub name: &'static str,
  pub price: f64,
  pub wait_time: u64,
}
