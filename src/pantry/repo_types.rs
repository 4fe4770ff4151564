use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// An item in one user's pantry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PantryItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub expiry_date: Option<Date>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl PantryItem {
    pub fn expires_by(&self, day: Date) -> bool {
        self.expiry_date.is_some_and(|d| d <= day)
    }
}

/// Soonest-expiring first, undated items last, then by name.
pub fn pantry_order(a: &PantryItem, b: &PantryItem) -> std::cmp::Ordering {
    match (a.expiry_date, b.expiry_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
    .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    .then_with(|| a.id.cmp(&b.id))
}
