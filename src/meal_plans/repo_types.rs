use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            other => anyhow::bail!("unknown meal type {other:?}"),
        }
    }
}

/// The per-(user, date) plan row.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MealPlanRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_date: Date,
}

#[derive(Debug, FromRow)]
pub struct MealPlanMealRow {
    pub id: Uuid,
    pub meal_plan_id: Uuid,
    pub recipe_id: Uuid,
    pub recipe_title: String,
    pub recipe_image_url: Option<String>,
    pub meal_type: String,
    pub meal_time: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanMeal {
    pub id: Uuid,
    pub meal_plan_id: Uuid,
    pub recipe_id: Uuid,
    pub recipe_title: String,
    pub recipe_image_url: Option<String>,
    pub meal_type: MealType,
    /// `HH:MM`, 24h.
    pub scheduled_time: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<MealPlanMealRow> for MealPlanMeal {
    type Error = anyhow::Error;

    fn try_from(r: MealPlanMealRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            meal_plan_id: r.meal_plan_id,
            recipe_id: r.recipe_id,
            recipe_title: r.recipe_title,
            recipe_image_url: r.recipe_image_url,
            meal_type: r.meal_type.parse()?,
            scheduled_time: r.meal_time,
            created_at: r.created_at,
        })
    }
}

/// A day's plan. `id` is `None` when nothing has been planned for the date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: Option<Uuid>,
    pub date: Date,
    pub meals: Vec<MealPlanMeal>,
}

/// Breakfast → snack, then by scheduled time (unscheduled last), then insertion.
pub fn meal_order(a: &MealPlanMeal, b: &MealPlanMeal) -> std::cmp::Ordering {
    a.meal_type
        .cmp(&b.meal_type)
        .then_with(|| match (&a.scheduled_time, &b.scheduled_time) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        })
        .then_with(|| a.created_at.cmp(&b.created_at))
}
