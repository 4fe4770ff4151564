use serde::Deserialize;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::repo_types::PantryItem;
use crate::error::AppError;

fn default_quantity() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPantryItem {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<Date>,
}

impl NewPantryItem {
    pub fn into_item(self, user_id: Uuid) -> PantryItem {
        let now = OffsetDateTime::now_utc();
        PantryItem {
            id: Uuid::new_v4(),
            user_id,
            name: self.name.trim().to_string(),
            quantity: self.quantity,
            unit: blank_to_none(self.unit),
            category: blank_to_none(self.category),
            expiry_date: self.expiry_date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial pantry item update; absent fields are left untouched.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PantryItemPatch {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub expiry_date: Option<Date>,
}

impl PantryItemPatch {
    pub fn apply(self, item: &mut PantryItem) {
        if let Some(v) = self.name {
            item.name = v.trim().to_string();
        }
        if let Some(v) = self.quantity {
            item.quantity = v;
        }
        if self.unit.is_some() {
            item.unit = blank_to_none(self.unit);
        }
        if self.category.is_some() {
            item.category = blank_to_none(self.category);
        }
        if let Some(v) = self.expiry_date {
            item.expiry_date = Some(v);
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExpiringQuery {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    3
}

fn blank_to_none(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub fn validate_item(item: &PantryItem) -> Result<(), AppError> {
    if item.name.is_empty() {
        return Err(AppError::validation("name is required"));
    }
    if !item.quantity.is_finite() || item.quantity < 0.0 {
        return Err(AppError::validation("quantity must be a non-negative number"));
    }
    Ok(())
}
