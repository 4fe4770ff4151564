use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{info, instrument, warn};

use super::{
    error::{FunctionError, FunctionResult},
    json_extract::extract_object,
    llm::{ChatMessage, CompletionRequest, LlmError},
};
use crate::state::AppState;

const TEMPERATURE: f32 = 0.8;
const MAX_TOKENS: u32 = 1500;
const REQUIRED_FIELDS: [&str; 2] = ["title", "ingredients"];

const SYSTEM_PROMPT: &str = "You are a creative chef who writes recipes as JSON. Respond with a \
single JSON object and nothing else, using these fields: title (string), description (string), \
prep_time_minutes (integer), cook_time_minutes (integer), servings (integer), difficulty \
(\"easy\", \"medium\" or \"hard\"), ingredients (array of {name, quantity, unit}), instructions \
(array of strings), macros ({calories, protein_g, carbs_g, fat_g}), tags (array of strings).";

#[derive(Debug, Deserialize)]
pub struct GenerateRecipeRequest {
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub preferences: Option<String>,
    #[serde(default)]
    pub restrictions: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateRecipeResponse {
    pub recipe: Map<String, Value>,
    pub timestamp: String,
}

fn user_prompt(ingredients: &[String], preferences: Option<&str>, restrictions: Option<&str>) -> String {
    let mut prompt = format!(
        "Create a recipe that uses these ingredients: {}.",
        ingredients.join(", ")
    );
    if let Some(p) = preferences {
        prompt.push_str(&format!("\nPreferences: {p}."));
    }
    if let Some(r) = restrictions {
        prompt.push_str(&format!("\nDietary restrictions (must be respected): {r}."));
    }
    prompt
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Parses the model reply into a recipe object carrying at least a title and ingredients.
pub fn parse_recipe(text: &str) -> FunctionResult<Map<String, Value>> {
    let recipe = extract_object(text)
        .ok_or_else(|| FunctionError::Parse("no JSON object in response".into()))?;
    for field in REQUIRED_FIELDS {
        if recipe.get(field).map_or(true, Value::is_null) {
            return Err(FunctionError::Parse(format!("missing `{field}`")));
        }
    }
    Ok(recipe)
}

#[instrument(skip(state, req), fields(ingredients = req.ingredients.len()))]
pub async fn generate_recipe(
    state: &AppState,
    req: GenerateRecipeRequest,
) -> FunctionResult<GenerateRecipeResponse> {
    let ingredients: Vec<String> = req
        .ingredients
        .iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect();
    if ingredients.is_empty() {
        return Err(FunctionError::BadRequest(
            "At least one ingredient is required".into(),
        ));
    }
    if !state.llm.is_configured() {
        return Err(LlmError::MissingKey.into());
    }

    let preferences = non_blank(req.preferences);
    let restrictions = non_blank(req.restrictions);
    let completion = CompletionRequest {
        messages: vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(user_prompt(
                &ingredients,
                preferences.as_deref(),
                restrictions.as_deref(),
            )),
        ],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    };
    let text = state.llm.complete(&completion).await?;
    let recipe = parse_recipe(&text).inspect_err(|e| warn!(error = %e, "unparseable recipe"))?;

    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| FunctionError::Parse(e.to_string()))?;
    info!(title = ?recipe.get("title"), "recipe generated");
    Ok(GenerateRecipeResponse { recipe, timestamp })
}

pub async fn handler(
    State(state): State<AppState>,
    body: Result<Json<GenerateRecipeRequest>, axum::extract::rejection::JsonRejection>,
) -> FunctionResult<Json<GenerateRecipeResponse>> {
    let Json(req) = body?;
    Ok(Json(generate_recipe(&state, req).await?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::functions::llm::ScriptedLlm;

    fn request(ingredients: &[&str]) -> GenerateRecipeRequest {
        GenerateRecipeRequest {
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            preferences: Some("spicy".into()),
            restrictions: Some("  ".into()),
        }
    }

    #[tokio::test]
    async fn empty_ingredients_error_without_llm_call() {
        let llm = Arc::new(ScriptedLlm::new(["{}"]));
        let state = AppState::fake().with_llm(llm.clone());
        for ingredients in [&[][..], &["", "  "][..]] {
            let err = generate_recipe(&state, request(ingredients)).await.unwrap_err();
            assert!(matches!(err, FunctionError::BadRequest(_)));
        }
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn returns_recipe_with_title_and_ingredients() {
        let reply = r#"Here you go!
```json
{"title": "Chili Chickpeas", "ingredients": [{"name": "chickpeas", "quantity": 1, "unit": "can"}], "instructions": ["Simmer"]}
```"#;
        let llm = Arc::new(ScriptedLlm::new([reply]));
        let state = AppState::fake().with_llm(llm.clone());

        let out = generate_recipe(&state, request(&["chickpeas", "chili"])).await.unwrap();
        assert_eq!(out.recipe["title"], "Chili Chickpeas");
        assert!(out.recipe["ingredients"].is_array());
        assert!(OffsetDateTime::parse(&out.timestamp, &Rfc3339).is_ok());

        let prompt = &llm.last_request().unwrap().messages[1].content;
        assert!(prompt.contains("chickpeas, chili"));
        assert!(prompt.contains("spicy"));
        assert!(!prompt.contains("restrictions"));
    }

    #[test]
    fn parse_requires_core_fields() {
        assert!(parse_recipe(r#"{"title": "Toast"}"#).is_err());
        assert!(parse_recipe("no recipe today").is_err());
        let ok = parse_recipe(r#"noise {"title": "Toast", "ingredients": ["bread"]} noise"#).unwrap();
        assert_eq!(ok["title"], "Toast");
    }
}
