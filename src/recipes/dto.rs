use std::cmp::Ordering;

use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Difficulty, Ingredient, Macros, Recipe};
use crate::{error::AppError, profiles::dto::clean_list};

const MAX_TITLE_LEN: usize = 200;
const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct NewRecipe {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub prep_time_minutes: Option<i32>,
    #[serde(default)]
    pub cook_time_minutes: Option<i32>,
    #[serde(default)]
    pub servings: Option<i32>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub macros: Macros,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewRecipe {
    pub fn into_recipe(self, author_id: Uuid) -> Recipe {
        let now = OffsetDateTime::now_utc();
        Recipe {
            id: Uuid::new_v4(),
            author_id,
            title: self.title.trim().to_string(),
            description: self.description,
            image_url: self.image_url,
            prep_time_minutes: self.prep_time_minutes,
            cook_time_minutes: self.cook_time_minutes,
            servings: self.servings,
            difficulty: self.difficulty,
            macros: self.macros,
            ingredients: self.ingredients,
            instructions: self.instructions,
            categories: clean_list(self.categories),
            tags: clean_list(self.tags),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial recipe update; absent fields are left untouched.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub prep_time_minutes: Option<i32>,
    pub cook_time_minutes: Option<i32>,
    pub servings: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub macros: Option<Macros>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub instructions: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

impl RecipePatch {
    pub fn apply(self, r: &mut Recipe) {
        if let Some(v) = self.title {
            r.title = v.trim().to_string();
        }
        if let Some(v) = self.description {
            r.description = Some(v);
        }
        if let Some(v) = self.prep_time_minutes {
            r.prep_time_minutes = Some(v);
        }
        if let Some(v) = self.cook_time_minutes {
            r.cook_time_minutes = Some(v);
        }
        if let Some(v) = self.servings {
            r.servings = Some(v);
        }
        if let Some(v) = self.difficulty {
            r.difficulty = v;
        }
        if let Some(v) = self.macros {
            r.macros = v;
        }
        if let Some(v) = self.ingredients {
            r.ingredients = v;
        }
        if let Some(v) = self.instructions {
            r.instructions = v;
        }
        if let Some(v) = self.categories {
            r.categories = clean_list(v);
        }
        if let Some(v) = self.tags {
            r.tags = clean_list(v);
        }
    }
}

/// Checks applied to a recipe before it is written.
pub fn validate_recipe(r: &Recipe) -> Result<(), AppError> {
    if r.title.is_empty() {
        return Err(AppError::validation("title is required"));
    }
    if r.title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::validation("title is too long"));
    }
    if r.prep_time_minutes.is_some_and(|m| m < 0) || r.cook_time_minutes.is_some_and(|m| m < 0) {
        return Err(AppError::validation("times must not be negative"));
    }
    if r.servings.is_some_and(|s| s <= 0) {
        return Err(AppError::validation("servings must be positive"));
    }
    if r.ingredients.iter().any(|i| i.name.trim().is_empty()) {
        return Err(AppError::validation("ingredient name is required"));
    }
    if r.ingredients.iter().any(|i| i.quantity.is_some_and(|q| q < 0.0)) {
        return Err(AppError::validation("ingredient quantity must not be negative"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecipeSort {
    #[default]
    Newest,
    Oldest,
    Title,
    Quickest,
}

impl RecipeSort {
    pub fn order_by(self) -> &'static str {
        match self {
            RecipeSort::Newest => "created_at DESC, id",
            RecipeSort::Oldest => "created_at ASC, id",
            RecipeSort::Title => "lower(title) ASC, id",
            RecipeSort::Quickest => {
                "CASE WHEN prep_time_minutes IS NULL AND cook_time_minutes IS NULL THEN 1 ELSE 0 END, \
                 COALESCE(prep_time_minutes, 0) + COALESCE(cook_time_minutes, 0) ASC, id"
            }
        }
    }

    pub fn compare(self, a: &Recipe, b: &Recipe) -> Ordering {
        let primary = match self {
            RecipeSort::Newest => b.created_at.cmp(&a.created_at),
            RecipeSort::Oldest => a.created_at.cmp(&b.created_at),
            RecipeSort::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            RecipeSort::Quickest => match (a.total_time_minutes(), b.total_time_minutes()) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Recipe list query. Every field is optional; unset fields do not filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeFilters {
    pub search: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub max_total_time: Option<i32>,
    pub author_id: Option<Uuid>,
    #[serde(default)]
    pub sort: RecipeSort,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl RecipeFilters {
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn matches(&self, r: &Recipe) -> bool {
        if let Some(term) = self.search_term() {
            let term = term.to_lowercase();
            let in_title = r.title.to_lowercase().contains(&term);
            let in_desc = r
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&term));
            if !in_title && !in_desc {
                return false;
            }
        }
        if let Some(c) = &self.category {
            if !r.categories.iter().any(|x| x.eq_ignore_ascii_case(c)) {
                return false;
            }
        }
        if let Some(t) = &self.tag {
            if !r.tags.iter().any(|x| x.eq_ignore_ascii_case(t)) {
                return false;
            }
        }
        if self.difficulty.is_some_and(|d| d != r.difficulty) {
            return false;
        }
        if let Some(max) = self.max_total_time {
            if r.total_time_minutes().unwrap_or(0) > max {
                return false;
            }
        }
        if self.author_id.is_some_and(|a| a != r.author_id) {
            return false;
        }
        true
    }
}
