use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use super::{
    error::{FunctionError, FunctionResult},
    llm::{ChatMessage, CompletionRequest, LlmError},
};
use crate::state::AppState;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1000;

const SYSTEM_PROMPT: &str = "You are an expert chef and cooking instructor. Answer cooking \
questions clearly and practically: suggest ingredient substitutions with ratios, explain \
techniques step by step, and propose recipes that fit the user's pantry and dietary needs. \
Keep answers concise and use metric and imperial units where helpful.";

#[derive(Debug, Deserialize)]
pub struct AiChefRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub context: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AiChefResponse {
    pub response: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Coarse label for the kind of question asked.
pub fn classify_query(query: &str) -> &'static str {
    let q = query.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| q.contains(w));
    if has(&["substitut", "instead of", "replace", "alternative to"]) {
        "substitution"
    } else if has(&["how do i", "how to", "technique", "method", "why does"]) {
        "technique"
    } else if has(&["recipe", "make with", "cook with", "dish", "meal"]) {
        "recipe"
    } else {
        "general"
    }
}

fn user_prompt(query: &str, context: Option<&Value>) -> String {
    match context.filter(|c| !c.is_null()) {
        Some(ctx) => format!("{query}\n\nAdditional context: {ctx}"),
        None => query.to_string(),
    }
}

#[instrument(skip(state, req))]
pub async fn ask_chef(state: &AppState, req: AiChefRequest) -> FunctionResult<AiChefResponse> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err(FunctionError::BadRequest("Query is required".into()));
    }
    if !state.llm.is_configured() {
        return Err(LlmError::MissingKey.into());
    }

    let completion = CompletionRequest {
        messages: vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(user_prompt(query, req.context.as_ref())),
        ],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    };
    let response = state.llm.complete(&completion).await?;
    let kind = classify_query(query);
    info!(kind, chars = response.len(), "ai-chef answered");
    Ok(AiChefResponse {
        response,
        kind: kind.to_string(),
    })
}

pub async fn handler(
    State(state): State<AppState>,
    body: Result<Json<AiChefRequest>, axum::extract::rejection::JsonRejection>,
) -> FunctionResult<Json<AiChefResponse>> {
    let Json(req) = body?;
    Ok(Json(ask_chef(&state, req).await?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::functions::llm::{ChatRole, ScriptedLlm};

    #[test]
    fn classifies_common_questions() {
        assert_eq!(classify_query("What can I use instead of buttermilk?"), "substitution");
        assert_eq!(classify_query("How do I julienne a carrot"), "technique");
        assert_eq!(classify_query("Give me a recipe with leeks"), "recipe");
        assert_eq!(classify_query("Is saffron expensive?"), "general");
    }

    #[tokio::test]
    async fn empty_query_never_reaches_the_llm() {
        let llm = Arc::new(ScriptedLlm::new(["unused"]));
        let state = AppState::fake().with_llm(llm.clone());
        let err = ask_chef(
            &state,
            AiChefRequest {
                query: "   ".into(),
                context: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FunctionError::BadRequest(_)));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn forwards_query_with_context() {
        let llm = Arc::new(ScriptedLlm::new(["Use yogurt thinned with milk."]));
        let state = AppState::fake().with_llm(llm.clone());
        let out = ask_chef(
            &state,
            AiChefRequest {
                query: "Substitute for buttermilk?".into(),
                context: Some(json!({ "pantry": ["yogurt", "milk"] })),
            },
        )
        .await
        .unwrap();
        assert_eq!(out.kind, "substitution");
        assert_eq!(out.response, "Use yogurt thinned with milk.");

        let sent = llm.last_request().unwrap();
        assert_eq!(sent.messages[0].role, ChatRole::System);
        assert!(sent.messages[1].content.contains("yogurt"));
        assert_eq!(sent.max_tokens, MAX_TOKENS);
    }

    #[tokio::test]
    async fn missing_key_is_a_server_error() {
        let state = AppState::fake();
        let err = ask_chef(
            &state,
            AiChefRequest {
                query: "hello".into(),
                context: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
