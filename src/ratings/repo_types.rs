use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipe_id: Uuid,
    pub rating: i32,
    pub review: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Aggregate over every rating of one recipe. `average` is `None` when unrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub recipe_id: Uuid,
    pub average: Option<f64>,
    pub count: usize,
    pub ratings: Vec<Rating>,
}

impl RatingSummary {
    pub fn from_ratings(recipe_id: Uuid, ratings: Vec<Rating>) -> Self {
        let count = ratings.len();
        let average = (count > 0).then(|| {
            let sum: i64 = ratings.iter().map(|r| i64::from(r.rating)).sum();
            (sum as f64 / count as f64 * 10.0).round() / 10.0
        });
        Self {
            recipe_id,
            average,
            count,
            ratings,
        }
    }
}
