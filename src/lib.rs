pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod favorites;
pub mod functions;
pub mod hooks;
pub mod meal_plans;
pub mod pantry;
pub mod profiles;
pub mod ratings;
pub mod recipes;
pub mod state;
pub mod storage;

pub use app::build_app;
pub use error::{AppError, AppResult};
pub use state::AppState;
