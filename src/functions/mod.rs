//! AI-proxy edge functions served under `/functions/v1`.

pub mod ai_chef;
pub mod assistant;
pub mod error;
pub mod json_extract;
pub mod llm;
pub mod recipe_generator;

use axum::{routing::post, Router};

use crate::state::AppState;

pub use error::FunctionError;
pub use llm::{LlmClient, LlmError, OpenAiClient, ScriptedLlm};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ai-chef", post(ai_chef::handler))
        .route("/ai-chef-assistant", post(assistant::handler))
        .route("/recipe-generator", post(recipe_generator::handler))
}
