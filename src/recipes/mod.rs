pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use dto::{NewRecipe, RecipeFilters, RecipePatch, RecipeSort};
pub use repo_types::{Difficulty, Ingredient, Macros, Recipe};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
