//! Pharmacy inventory models.

use serde::{Deserialize, Serialize};

use super::wire;

/// A medicine record in the pharmacy inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medicine {
    /// Backend ID
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Medicine name, matched case-insensitively against prescription lines
    pub name: String,
    /// Manufacturer
    #[serde(default)]
    pub manufacturer: String,
    /// Unit price
    #[serde(default, deserialize_with = "wire::lenient_f64")]
    pub price: f64,
    /// Units on hand
    #[serde(default, deserialize_with = "wire::lenient_i64")]
    pub quantity: i64,
}

impl Medicine {
    /// Create a medicine with the fields used for stock lookups.
    pub fn new(id: impl Into<String>, name: impl Into<String>, quantity: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            manufacturer: String::new(),
            price: 0.0,
            quantity,
        }
    }

    /// Check if at least one unit is on hand.
    pub fn is_in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Body of `POST /api/medicines`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMedicine {
    pub name: String,
    pub manufacturer: String,
    pub price: f64,
    pub quantity: i64,
}
