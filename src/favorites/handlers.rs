use axum::{extract::State, routing::get, Json, Router};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    extract::AppJson,
    favorites::{
        dto::{ToggleFavoriteRequest, ToggleFavoriteResponse},
        repo_types::Favorite,
    },
    recipes::repo_types::Recipe,
    state::AppState,
};

pub fn favorite_routes() -> Router<AppState> {
    Router::new().route("/favorites", get(list_favorites).post(toggle_favorite))
}

/// The caller's favorited recipes, most recently favorited first.
#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Recipe>>, AppError> {
    Ok(Json(favorite_recipes(&state, user_id).await))
}

#[instrument(skip(state, payload))]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<ToggleFavoriteRequest>,
) -> Result<Json<ToggleFavoriteResponse>, AppError> {
    let recipe_id = payload.recipe_id;
    if Recipe::find_unique(&state.db, recipe_id).await.is_none() {
        return Err(AppError::not_found("Recipe not found"));
    }

    let favorited = Favorite::toggle(&state.db, user_id, recipe_id).await;
    info!(%user_id, %recipe_id, favorited, "favorite toggled");
    Ok(Json(ToggleFavoriteResponse { favorited }))
}

/// Recipes a user has favorited, skipping any that no longer exist.
pub(crate) async fn favorite_recipes(state: &AppState, user_id: Uuid) -> Vec<Recipe> {
    let favorites = Favorite::find_many_by_user(&state.db, user_id).await;
    let mut recipes = Vec::with_capacity(favorites.len());
    for fav in favorites {
        if let Some(recipe) = Recipe::find_unique(&state.db, fav.recipe_id).await {
            recipes.push(recipe);
        }
    }
    recipes
}
