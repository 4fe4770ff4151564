use serde::Deserialize;
use time::{Date, Time};
use uuid::Uuid;

use super::repo_types::MealType;
use crate::error::AppError;

/// Longest range a single week/month view may request.
pub const MAX_RANGE_DAYS: i64 = 62;

#[derive(Debug, Clone, Deserialize)]
pub struct AddMealRequest {
    pub recipe_id: Uuid,
    pub meal_type: MealType,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: Date,
    pub to: Date,
}

/// Normalises `H:MM` / `HH:MM` / `HH:MM:SS` into `HH:MM`.
pub fn normalize_time(raw: &str) -> Result<String, AppError> {
    let invalid = || AppError::validation(format!("invalid time {raw:?}, expected HH:MM"));
    let mut parts = raw.trim().split(':');
    let hour: u8 = parts.next().and_then(|h| h.parse().ok()).ok_or_else(invalid)?;
    let minute: u8 = parts
        .next()
        .filter(|m| m.len() == 2)
        .and_then(|m| m.parse().ok())
        .ok_or_else(invalid)?;
    let second: u8 = match parts.next() {
        Some(s) => s.parse().map_err(|_| invalid())?,
        None => 0,
    };
    if parts.next().is_some() {
        return Err(invalid());
    }
    let t = Time::from_hms(hour, minute, second).map_err(|_| invalid())?;
    Ok(format!("{:02}:{:02}", t.hour(), t.minute()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_normalisation() {
        assert_eq!(normalize_time("7:30").unwrap(), "07:30");
        assert_eq!(normalize_time("18:05:00").unwrap(), "18:05");
        assert!(normalize_time("24:00").is_err());
        assert!(normalize_time("12:5").is_err());
        assert!(normalize_time("noon").is_err());
        assert!(normalize_time("1:00:00:00").is_err());
    }
}
