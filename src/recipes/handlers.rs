use axum::{
    extract::State,
    http::{header, HeaderName, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        extractors::AuthUser,
        repo_types::{User, UserWhere},
    },
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    favorites::repo_types::Favorite,
    recipes::{
        dto::{
            AuthorSummary, DeleteRecipeResponse, ListRecipesQuery, RecipeDetails, RecipeInput,
            RecipeListResponse, RecipeSort, RecipeWithCount,
        },
        repo_types::{AuthorWrite, NewRecipe, Recipe, RecipeFindMany, RecipeOrderBy},
        services::{
            has_all_tags, matches_search, page_bounds, parse_tag_filter, sort_recipes,
            validate_recipe,
        },
    },
    state::AppState,
};

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/recipes/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
}

/// Filter the whole feed first, then cut the requested page, so `total`
/// always counts matches.
#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    AppQuery(q): AppQuery<ListRecipesQuery>,
) -> Result<Json<RecipeListResponse>, AppError> {
    let mut recipes = Recipe::find_many(
        &state.db,
        RecipeFindMany {
            author_id: q.author,
            order_by: Some(RecipeOrderBy::CreatedAtDesc),
            ..Default::default()
        },
    )
    .await;

    let wanted_tags = parse_tag_filter(q.tags.as_deref());
    let search = q.search.as_deref().unwrap_or_default();
    recipes.retain(|r| matches_search(r, search) && has_all_tags(r, &wanted_tags));
    sort_recipes(&mut recipes, RecipeSort::from_query(q.sort.as_deref()));

    let page = q.page.unwrap_or(1).max(1);
    let page_size = state.config.page_size;
    let total = recipes.len();
    let (start, end, total_pages) = page_bounds(page, page_size, total);

    let counts = Favorite::counts_by_recipe(&state.db).await;
    let items = recipes
        .drain(start..end)
        .map(|recipe| RecipeWithCount {
            favorite_count: counts.get(&recipe.id).copied().unwrap_or(0),
            recipe,
        })
        .collect();

    Ok(Json(RecipeListResponse {
        recipes: items,
        page,
        page_size,
        total,
        total_pages,
    }))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<RecipeDetails>, AppError> {
    let recipe = Recipe::find_unique(&state.db, id)
        .await
        .ok_or_else(|| AppError::not_found("Recipe not found"))?;

    let author = User::find_unique(&state.db, UserWhere::Id(recipe.author_id))
        .await
        .map(|u| AuthorSummary {
            id: u.id,
            display_name: u.display_name,
        });
    let favorite_count = Favorite::count(&state.db, Some(id)).await;
    let favorited = match viewer {
        Some(AuthUser(user_id)) => Some(Favorite::find_unique(&state.db, user_id, id).await.is_some()),
        None => None,
    };

    Ok(Json(RecipeDetails {
        recipe,
        author,
        favorite_count,
        favorited,
    }))
}

#[instrument(skip(state, input))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(input): AppJson<RecipeInput>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<Recipe>), AppError> {
    if User::find_unique(&state.db, UserWhere::Id(user_id)).await.is_none() {
        warn!(%user_id, "token for unknown user");
        return Err(AppError::unauthorized("User not found"));
    }
    let data = validate_recipe(input)?;

    let recipe = Recipe::create(
        &state.db,
        NewRecipe {
            id: None,
            author_id: user_id,
            data,
        },
    )
    .await;

    info!(recipe_id = %recipe.id, %user_id, "recipe created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/recipes/{}", recipe.id))],
        Json(recipe),
    ))
}

#[instrument(skip(state, input))]
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(input): AppJson<RecipeInput>,
) -> Result<Json<Recipe>, AppError> {
    let data = validate_recipe(input)?;
    let recipe = author_write(
        Recipe::update_by_author(&state.db, id, user_id, data).await,
        id,
        user_id,
    )?;
    info!(recipe_id = %id, %user_id, "recipe updated");
    Ok(Json(recipe))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<DeleteRecipeResponse>, AppError> {
    author_write(Recipe::delete_by_author(&state.db, id, user_id).await, id, user_id)?;
    info!(recipe_id = %id, %user_id, "recipe deleted");
    Ok(Json(DeleteRecipeResponse { success: true }))
}

/// 404 when missing, 403 when `user_id` is not the author.
fn author_write<T>(outcome: AuthorWrite<T>, id: Uuid, user_id: Uuid) -> Result<T, AppError> {
    match outcome {
        AuthorWrite::Done(value) => Ok(value),
        AuthorWrite::NotFound => Err(AppError::not_found("Recipe not found")),
        AuthorWrite::NotAuthor { author_id } => {
            warn!(recipe_id = %id, %user_id, %author_id, "not the recipe owner");
            Err(AppError::Forbidden("You do not own this recipe".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::recipes::repo_types::Recipe;
    use crate::test_support::{recipe_body, send, test_app, user_with_token};

    #[tokio::test]
    async fn create_requires_session() {
        let (_, app) = test_app();
        let (status, _) = send(&app, Method::POST, "/api/recipes", None, Some(recipe_body("Toast"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_then_get_details() {
        let (state, app) = test_app();
        let (user, token) = user_with_token(&state, "cook@example.com", "Cook").await;

        let (status, created) =
            send(&app, Method::POST, "/api/recipes", Some(token.as_str()), Some(recipe_body("Toast"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["title"], "Toast");
        assert_eq!(created["authorId"], user.id.to_string());
        assert_eq!(created["cookingTime"], 5);
        let id = created["id"].as_str().unwrap().to_string();

        let (status, details) = send(&app, Method::GET, &format!("/api/recipes/{id}"), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(details["author"]["displayName"], "Cook");
        assert_eq!(details["favoriteCount"], 0);
        assert!(details.get("favorited").is_none());

        let (_, details) =
            send(&app, Method::GET, &format!("/api/recipes/{id}"), Some(token.as_str()), None).await;
        assert_eq!(details["favorited"], false);
    }

    #[tokio::test]
    async fn create_rejects_invalid_fields() {
        let (state, app) = test_app();
        let (_, token) = user_with_token(&state, "cook@example.com", "Cook").await;
        let mut body = recipe_body("Toast");
        body["servings"] = json!(0);
        body["ingredients"] = json!([]);

        let (status, err) = send(&app, Method::POST, "/api/recipes", Some(token.as_str()), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err["details"]["servings"].is_array());
        assert!(err["details"]["ingredients"].is_array());
    }

    #[tokio::test]
    async fn unknown_or_malformed_id() {
        let (_, app) = test_app();
        let (status, _) = send(
            &app,
            Method::GET,
            "/api/recipes/00000000-0000-0000-0000-000000000000",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::GET, "/api/recipes/not-a-uuid", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn owner_can_edit_and_id_is_stable() {
        let (state, app) = test_app();
        let (_, token) = user_with_token(&state, "owner@example.com", "Owner").await;
        let (_, created) =
            send(&app, Method::POST, "/api/recipes", Some(token.as_str()), Some(recipe_body("Toast"))).await;
        let id = created["id"].as_str().unwrap().to_string();

        let (status, updated) = send(
            &app,
            Method::PUT,
            &format!("/api/recipes/{id}"),
            Some(token.as_str()),
            Some(recipe_body("Cinnamon Toast")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], id.as_str());
        assert_eq!(updated["title"], "Cinnamon Toast");
        assert_eq!(updated["createdAt"], created["createdAt"]);
    }

    #[tokio::test]
    async fn non_owner_is_forbidden_and_recipe_unchanged() {
        let (state, app) = test_app();
        let (_, owner) = user_with_token(&state, "owner@example.com", "Owner").await;
        let (_, other) = user_with_token(&state, "other@example.com", "Other").await;
        let (_, created) =
            send(&app, Method::POST, "/api/recipes", Some(owner.as_str()), Some(recipe_body("Toast"))).await;
        let id = created["id"].as_str().unwrap().to_string();
        let uri = format!("/api/recipes/{id}");

        let (status, _) = send(&app, Method::PUT, &uri, Some(other.as_str()), Some(recipe_body("Hijacked"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&app, Method::DELETE, &uri, Some(other.as_str()), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let rid = id.parse().unwrap();
        let stored = Recipe::find_unique(&state.db, rid).await.expect("still there");
        assert_eq!(stored.title, "Toast");

        let (status, _) = send(&app, Method::DELETE, &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn owner_delete_removes_recipe() {
        let (state, app) = test_app();
        let (_, token) = user_with_token(&state, "owner@example.com", "Owner").await;
        let (_, created) =
            send(&app, Method::POST, "/api/recipes", Some(token.as_str()), Some(recipe_body("Toast"))).await;
        let uri = format!("/api/recipes/{}", created["id"].as_str().unwrap());

        let (status, body) = send(&app, Method::DELETE, &uri, Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));

        let (status, _) = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::DELETE, &uri, Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, list) = send(&app, Method::GET, "/api/recipes", None, None).await;
        assert_eq!(list["total"], 0);
    }

    #[tokio::test]
    async fn listing_filters_before_paging() {
        let (mut state, _) = test_app();
        let mut config = (*state.config).clone();
        config.page_size = 2;
        state.config = std::sync::Arc::new(config);
        let app = crate::app::build_app(state.clone());
        let (_, token) = user_with_token(&state, "cook@example.com", "Cook").await;

        for (title, minutes, tags) in [
            ("Pancakes", 3, json!(["breakfast"])),
            ("Salad", 10, json!(["lunch", "vegetarian"])),
            ("Omelette", 8, json!(["breakfast", "vegetarian"])),
            ("Porridge", 12, json!(["breakfast"])),
            ("Steak", 25, json!(["dinner"])),
        ] {
            let mut body = recipe_body(title);
            body["cookingTime"] = json!(minutes);
            body["tags"] = tags;
            send(&app, Method::POST, "/api/recipes", Some(token.as_str()), Some(body)).await;
        }

        let (status, page1) = send(&app, Method::GET, "/api/recipes?tags=breakfast", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page1["total"], 3);
        assert_eq!(page1["pageSize"], 2);
        assert_eq!(page1["totalPages"], 2);
        let titles: Vec<&str> = page1["recipes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, ["Porridge", "Omelette"]);

        let (_, page2) = send(&app, Method::GET, "/api/recipes?tags=breakfast&page=2", None, None).await;
        assert_eq!(page2["recipes"].as_array().unwrap().len(), 1);
        assert_eq!(page2["recipes"][0]["title"], "Pancakes");

        let (_, veg) = send(
            &app,
            Method::GET,
            "/api/recipes?tags=breakfast,vegetarian&search=omel",
            None,
            None,
        )
        .await;
        assert_eq!(veg["total"], 1);

        let (_, by_title) = send(&app, Method::GET, "/api/recipes?sort=title", None, None).await;
        assert_eq!(by_title["recipes"][0]["title"], "Omelette");
        assert_eq!(by_title["recipes"][0]["favoriteCount"], 0);

        let (_, by_time) = send(&app, Method::GET, "/api/recipes?sort=cookingTime", None, None).await;
        assert_eq!(by_time["recipes"][0]["title"], "Pancakes");

        let (status, unknown) = send(&app, Method::GET, "/api/recipes?sort=spiciest", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(unknown["recipes"][0]["title"], "Steak");
        assert_eq!(unknown["total"], 5);
    }

    #[tokio::test]
    async fn listing_by_author() {
        let (state, app) = test_app();
        let (ann, ann_token) = user_with_token(&state, "ann@example.com", "Ann").await;
        let (_, ben_token) = user_with_token(&state, "ben@example.com", "Ben").await;
        send(&app, Method::POST, "/api/recipes", Some(ann_token.as_str()), Some(recipe_body("Toast"))).await;
        send(&app, Method::POST, "/api/recipes", Some(ben_token.as_str()), Some(recipe_body("Soup"))).await;
        send(&app, Method::POST, "/api/recipes", Some(ann_token.as_str()), Some(recipe_body("Salad"))).await;

        let (status, list) =
            send(&app, Method::GET, &format!("/api/recipes?author={}", ann.id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["total"], 2);
        let titles: Vec<&str> = list["recipes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, ["Salad", "Toast"]);

        let (status, _) = send(&app, Method::GET, "/api/recipes?author=nobody", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn tags_keep_their_casing() {
        let (state, app) = test_app();
        let (_, token) = user_with_token(&state, "cook@example.com", "Cook").await;
        let mut body = recipe_body("Carbonara");
        body["tags"] = json!(["Italian", " Dinner ", "Italian"]);

        let (status, created) = send(&app, Method::POST, "/api/recipes", Some(token.as_str()), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["tags"], json!(["Italian", "Dinner"]));

        let (_, list) = send(&app, Method::GET, "/api/recipes?tags=italian", None, None).await;
        assert_eq!(list["total"], 1);
        assert_eq!(list["recipes"][0]["tags"], json!(["Italian", "Dinner"]));
    }

    #[tokio::test]
    async fn title_length_boundary() {
        let (state, app) = test_app();
        let (_, token) = user_with_token(&state, "cook@example.com", "Cook").await;

        let (status, err) =
            send(&app, Method::POST, "/api/recipes", Some(token.as_str()), Some(recipe_body("Hi"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err["details"]["title"].is_array());

        let (status, _) =
            send(&app, Method::POST, "/api/recipes", Some(token.as_str()), Some(recipe_body("Hi!"))).await;
        assert_eq!(status, StatusCode::CREATED);

        let mut body = recipe_body("Toast");
        body["instructions"] = json!("Toast it.");
        let (status, err) = send(&app, Method::POST, "/api/recipes", Some(token.as_str()), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err["details"]["instructions"].is_array());
    }
}
