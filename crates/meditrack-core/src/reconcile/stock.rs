//! Case-insensitive stock lookup over the pharmacy inventory.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::Medicine;

/// Result of looking a medicine name up in the inventory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StockStatus {
    /// No inventory record has this name
    NotFound,
    /// Known medicine with no units on hand
    OutOfStock,
    /// Known medicine with units on hand
    InStock { quantity: i64 },
}

/// Who a stock label is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAudience {
    Patient,
    Pharmacy,
}

impl StockStatus {
    pub fn is_found(&self) -> bool {
        !matches!(self, StockStatus::NotFound)
    }

    pub fn in_stock(&self) -> bool {
        matches!(self, StockStatus::InStock { .. })
    }

    /// Units on hand, or `None` when the medicine is unknown.
    pub fn quantity(&self) -> Option<i64> {
        match self {
            StockStatus::NotFound => None,
            StockStatus::OutOfStock => Some(0),
            StockStatus::InStock { quantity } => Some(*quantity),
        }
    }

    /// Human-readable label for the given audience.
    pub fn label(&self, audience: StockAudience) -> String {
        match (audience, self) {
            (StockAudience::Patient, StockStatus::NotFound) => "Not in database".into(),
            (StockAudience::Patient, StockStatus::OutOfStock) => "Out of stock".into(),
            (StockAudience::Patient, StockStatus::InStock { quantity }) => {
                format!("In stock (Qty: {})", quantity)
            }
            (StockAudience::Pharmacy, StockStatus::NotFound) => "Not in system".into(),
            (StockAudience::Pharmacy, StockStatus::OutOfStock) => "Out of Stock".into(),
            (StockAudience::Pharmacy, StockStatus::InStock { quantity }) => {
                format!("In Stock ({})", quantity)
            }
        }
    }
}

/// Lookup from lower-cased medicine name to quantity.
///
/// Always built from a full inventory list; there is no incremental update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockIndex {
    quantities: HashMap<String, i64>,
}

impl StockIndex {
    /// Build the index from the full inventory. When names collide the
    /// first record in list order wins.
    pub fn build(medicines: &[Medicine]) -> Self {
        let mut quantities = HashMap::with_capacity(medicines.len());
        for medicine in medicines {
            quantities
                .entry(medicine.name.to_lowercase())
                .or_insert(medicine.quantity);
        }
        Self { quantities }
    }

    /// Exact, case-insensitive lookup. No trimming or partial matching.
    pub fn lookup(&self, name: &str) -> StockStatus {
        match self.quantities.get(&name.to_lowercase()) {
            None => StockStatus::NotFound,
            Some(&quantity) if quantity > 0 => StockStatus::InStock { quantity },
            Some(_) => StockStatus::OutOfStock,
        }
    }

    /// Number of distinct medicine names.
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}
