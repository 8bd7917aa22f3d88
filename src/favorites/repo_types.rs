use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// Join record marking a user's bookmark of a recipe.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipe_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Delete target: a favorite id or its (user, recipe) pair.
#[derive(Debug, Clone, Copy)]
pub enum FavoriteWhere {
    Id(Uuid),
    Pair { user_id: Uuid, recipe_id: Uuid },
}
