use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use time::Date;
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{AddMealRequest, RangeQuery},
    repo_types::{MealPlan, MealPlanMeal},
    services,
};
use crate::{auth::AuthUser, error::AppResult, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/meal-plans", get(list_plans))
        .route("/planned-meals/:id", delete(remove_meal))
        .route("/meal-plans/:date", get(get_plan))
        .route("/meal-plans/:date/meals", post(add_meal))
}

#[instrument(skip(state))]
async fn list_plans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(range): Query<RangeQuery>,
) -> AppResult<Json<Vec<MealPlan>>> {
    Ok(Json(
        services::get_meal_plans(&state, user_id, range.from, range.to).await?,
    ))
}

#[instrument(skip(state))]
async fn get_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<Date>,
) -> AppResult<Json<MealPlan>> {
    Ok(Json(services::get_meal_plan(&state, user_id, date).await?))
}

#[instrument(skip(state, body))]
async fn add_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<Date>,
    Json(body): Json<AddMealRequest>,
) -> AppResult<(StatusCode, Json<MealPlanMeal>)> {
    let meal = services::add_meal_to_plan(
        &state,
        user_id,
        date,
        body.recipe_id,
        body.meal_type,
        body.time.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(meal)))
}

#[instrument(skip(state))]
async fn remove_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    services::remove_meal_from_plan(&state, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
