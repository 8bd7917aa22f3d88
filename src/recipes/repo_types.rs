use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub quantity: String,
    pub item: String,
}

/// Recipe record in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: String,
    pub cooking_time: u32, // minutes
    pub servings: u32,
    pub tags: Vec<String>,
    pub author_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The author-editable part of a recipe, already validated and normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeData {
    pub title: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: String,
    pub cooking_time: u32,
    pub servings: u32,
    pub tags: Vec<String>,
}

/// Input for `Recipe::create`. A missing id is generated.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub id: Option<Uuid>,
    pub author_id: Uuid,
    pub data: RecipeData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeOrderBy {
    CreatedAtDesc,
}

/// Arguments for `Recipe::find_many`; every field is optional.
#[derive(Debug, Clone, Default)]
pub struct RecipeFindMany {
    pub author_id: Option<Uuid>,
    pub order_by: Option<RecipeOrderBy>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
}

/// Result of a write only the recipe's author may make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorWrite<T> {
    Done(T),
    NotFound,
    NotAuthor { author_id: Uuid },
}
