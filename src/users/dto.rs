use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::recipes::repo_types::Recipe;

/// Public profile; email stays private.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub display_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub recipes: Vec<Recipe>,
    pub favorites: Vec<Recipe>,
}
