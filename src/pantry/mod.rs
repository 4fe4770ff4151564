pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use dto::{NewPantryItem, PantryItemPatch};
pub use repo_types::PantryItem;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
