use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::repo_types::{User, UserWhere},
    error::AppError,
    extract::AppPath,
    favorites::handlers::favorite_recipes,
    recipes::repo_types::{Recipe, RecipeFindMany, RecipeOrderBy},
    state::AppState,
    users::dto::UserProfile,
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users/:id", get(get_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<UserProfile>, AppError> {
    let user = User::find_unique(&state.db, UserWhere::Id(id))
        .await
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let recipes = Recipe::find_many(
        &state.db,
        RecipeFindMany {
            author_id: Some(id),
            order_by: Some(RecipeOrderBy::CreatedAtDesc),
            ..Default::default()
        },
    )
    .await;
    let favorites = favorite_recipes(&state, id).await;

    Ok(Json(UserProfile {
        id: user.id,
        display_name: user.display_name,
        created_at: user.created_at,
        recipes,
        favorites,
    }))
}
