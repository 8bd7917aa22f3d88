use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::recipes::repo_types::Recipe;

#[derive(Debug, Clone, Deserialize)]
pub struct IngredientInput {
    pub quantity: String,
    pub item: String,
}

/// Body of POST /recipes and PUT /recipes/:id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInput {
    pub title: String,
    pub ingredients: Vec<IngredientInput>,
    pub instructions: String,
    pub cooking_time: i64,
    pub servings: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecipeSort {
    #[default]
    Newest,
    Oldest,
    CookingTime,
    Title,
}

impl RecipeSort {
    /// Lenient parse of the `sort` query value; anything unknown is `Newest`.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("oldest") => Self::Oldest,
            Some("cookingTime" | "quickest") => Self::CookingTime,
            Some("title") => Self::Title,
            _ => Self::Newest,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListRecipesQuery {
    pub page: Option<usize>,
    pub search: Option<String>,
    /// Comma-separated; a recipe must carry every listed tag.
    pub tags: Option<String>,
    /// `newest`, `oldest`, `cookingTime` or `title`; see [`RecipeSort::from_query`].
    pub sort: Option<String>,
    /// Only recipes by this user.
    pub author: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeWithCount {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub favorite_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeListResponse {
    pub recipes: Vec<RecipeWithCount>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub id: Uuid,
    pub display_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetails {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub author: Option<AuthorSummary>,
    pub favorite_count: usize,
    /// Only present for authenticated callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorited: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct DeleteRecipeResponse {
    pub success: bool,
}
