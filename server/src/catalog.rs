// server/src/catalog.rs

//! The static munchkin catalog. Pure read-only lookup, no state.

use crate::models::Munchkin;

const MENU: &[Munchkin] = &[
  Munchkin { name: "Choco Munchkin", price: 10.0, wait_time: 3 },
  Munchkin { name: "Butternut Munchkin", price: 15.0, wait_time: 2 },
  Munchkin { name: "Choco Butternut Munchkin", price: 20.0, wait_time: 2 },
  Munchkin { name: "Choco Honey Dip Munchkin", price: 25.0, wait_time: 2 },
  Munchkin { name: "Choco Honey Dip Butternut Munchkin", price: 30.0, wait_time: 3 },
  Munchkin { name: "Choco Honey Dip Butternut Munchkin with Almonds", price: 35.0, wait_time: 5 },
  Munchkin { name: "Matcha Munchkin", price: 90.0, wait_time: 3 },
];

/// The full menu, in presentation order.
pub fn munchkins() -> &'static [Munchkin] {
  MENU
}

/// Looks up one munchkin by its exact name.
pub fn get(name: &str) -> Option<&'static Munchkin> {
  MENU.iter().find(|m| m.name == name)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_name_resolves() {
    let m = get("Choco Munchkin").expect("catalog entry");
    assert_eq!(m.price, 10.0);
    assert_eq!(m.wait_time, 3);
  }

  #[test]
  fn unknown_name_is_none() {
    assert!(get("Bacon Munchkin").is_none());
  }
}
