use std::cmp::Reverse;

use crate::error::{AppError, FieldErrors};
use crate::recipes::dto::{RecipeInput, RecipeSort};
use crate::recipes::repo_types::{Ingredient, Recipe, RecipeData};

const MIN_TITLE_LEN: usize = 3;
const MAX_TITLE_LEN: usize = 100;
const MIN_INSTRUCTIONS_LEN: usize = 10;

/// Check a recipe body and turn it into trimmed fields.
///
/// Tags keep the casing they were submitted with; only exact duplicates are
/// dropped.
pub(crate) fn validate_recipe(input: RecipeInput) -> Result<RecipeData, AppError> {
    let mut errs = FieldErrors::new();

    let title = input.title.trim().to_string();
    let title_len = title.chars().count();
    if title_len < MIN_TITLE_LEN {
        errs.add("title", format!("Title must be at least {MIN_TITLE_LEN} characters"));
    } else if title_len > MAX_TITLE_LEN {
        errs.add("title", format!("Title must be at most {MAX_TITLE_LEN} characters"));
    }

    if input.ingredients.is_empty() {
        errs.add("ingredients", "At least one ingredient is required");
    }
    let ingredients: Vec<Ingredient> = input
        .ingredients
        .into_iter()
        .enumerate()
        .map(|(i, ing)| {
            let item = ing.item.trim().to_string();
            if item.is_empty() {
                errs.add(&format!("ingredients[{i}].item"), "Item is required");
            }
            Ingredient {
                quantity: ing.quantity.trim().to_string(),
                item,
            }
        })
        .collect();

    let instructions = input.instructions.trim().to_string();
    if instructions.chars().count() < MIN_INSTRUCTIONS_LEN {
        errs.add(
            "instructions",
            format!("Instructions must be at least {MIN_INSTRUCTIONS_LEN} characters"),
        );
    }

    let cooking_time = u32::try_from(input.cooking_time).ok().filter(|&m| m > 0);
    if cooking_time.is_none() {
        errs.add("cookingTime", "Cooking time must be a positive number of minutes");
    }
    let servings = u32::try_from(input.servings).ok().filter(|&n| n > 0);
    if servings.is_none() {
        errs.add("servings", "Servings must be a positive number");
    }

    let mut tags: Vec<String> = Vec::new();
    for raw in &input.tags {
        let tag = raw.trim();
        if tag.is_empty() {
            errs.add("tags", "Tags cannot be empty");
        } else if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }

    errs.into_result()?;
    Ok(RecipeData {
        title,
        ingredients,
        instructions,
        cooking_time: cooking_time.unwrap_or_default(),
        servings: servings.unwrap_or_default(),
        tags,
    })
}

/// Split a comma-separated tag filter into trimmed tags.
pub(crate) fn parse_tag_filter(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Case-insensitive substring match on title, ingredient items and tags.
pub(crate) fn matches_search(recipe: &Recipe, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    recipe.title.to_lowercase().contains(&needle)
        || recipe
            .ingredients
            .iter()
            .any(|i| i.item.to_lowercase().contains(&needle))
        || recipe.tags.iter().any(|t| t.to_lowercase().contains(&needle))
}

/// Every wanted tag is on the recipe, compared case-insensitively.
pub(crate) fn has_all_tags(recipe: &Recipe, wanted: &[String]) -> bool {
    wanted.iter().all(|w| {
        let w = w.to_lowercase();
        recipe.tags.iter().any(|t| t.to_lowercase() == w)
    })
}

/// Stable sort; input is expected newest-first so ties keep that order.
pub(crate) fn sort_recipes(recipes: &mut [Recipe], sort: RecipeSort) {
    match sort {
        RecipeSort::Newest => recipes.sort_by_key(|r| Reverse(r.created_at)),
        RecipeSort::Oldest => {
            recipes.reverse();
            recipes.sort_by_key(|r| r.created_at);
        }
        RecipeSort::CookingTime => recipes.sort_by_key(|r| r.cooking_time),
        RecipeSort::Title => recipes.sort_by_cached_key(|r| r.title.to_lowercase()),
    }
}

/// 1-based page slice bounds and the page count for `total` items.
pub(crate) fn page_bounds(page: usize, page_size: usize, total: usize) -> (usize, usize, usize) {
    let total_pages = total.div_ceil(page_size);
    let start = (page - 1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    (start, end, total_pages)
}
