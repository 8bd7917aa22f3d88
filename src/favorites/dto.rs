use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFavoriteRequest {
    pub recipe_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ToggleFavoriteResponse {
    pub favorited: bool,
}
