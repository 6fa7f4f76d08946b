//! Pharmacy inventory form.

use thiserror::Error;

use crate::models::NewMedicine;

/// Reasons a medicine cannot be added.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Please fill all fields! Missing: {0}")]
    MissingField(&'static str),

    #[error("Price must be a non-negative number, got {0:?}")]
    InvalidPrice(String),

    #[error("Quantity must be a non-negative whole number, got {0:?}")]
    InvalidQuantity(String),
}

/// Raw text inputs of the "add medicine" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicineForm {
    pub name: String,
    pub manufacturer: String,
    pub price: String,
    pub quantity: String,
}

impl MedicineForm {
    pub fn new(
        name: impl Into<String>,
        manufacturer: impl Into<String>,
        price: impl Into<String>,
        quantity: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            manufacturer: manufacturer.into(),
            price: price.into(),
            quantity: quantity.into(),
        }
    }

    /// Check presence of every field, then parse the numbers.
    pub fn validate(&self) -> Result<NewMedicine, InventoryError> {
        let fields = [
            ("name", &self.name),
            ("manufacturer", &self.manufacturer),
            ("price", &self.price),
            ("quantity", &self.quantity),
        ];
        if let Some((label, _)) = fields.into_iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(InventoryError::MissingField(label));
        }

        let price = self
            .price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .ok_or_else(|| InventoryError::InvalidPrice(self.price.clone()))?;

        let quantity = self
            .quantity
            .trim()
            .parse::<u32>()
            .map_err(|_| InventoryError::InvalidQuantity(self.quantity.clone()))?;

        Ok(NewMedicine {
            name: self.name.trim().to_string(),
            manufacturer: self.manufacturer.trim().to_string(),
            price,
            quantity: i64::from(quantity),
        })
    }

    /// Empty every input.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
