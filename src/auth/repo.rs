use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User, UserWhere};
use crate::db::{Db, Tables};

impl User {
    /// Find a user by id or by email (case-insensitive).
    pub async fn find_unique(db: &Db, by: UserWhere<'_>) -> Option<User> {
        let t = db.read().await;
        Self::lookup(&t, by).cloned()
    }

    /// Insert a user. Does not check the email index; callers that need
    /// uniqueness use `create_unique`.
    pub async fn create(db: &Db, data: NewUser) -> User {
        let mut t = db.write().await;
        Self::insert(&mut t, data)
    }

    /// Insert a user unless the email is already registered.
    pub async fn create_unique(db: &Db, data: NewUser) -> Option<User> {
        let mut t = db.write().await;
        if t.users_by_email.contains_key(&data.email.to_lowercase()) {
            return None;
        }
        Some(Self::insert(&mut t, data))
    }

    pub async fn count(db: &Db) -> usize {
        db.read().await.users.len()
    }

    pub(crate) fn lookup<'t>(t: &'t Tables, by: UserWhere<'_>) -> Option<&'t User> {
        match by {
            UserWhere::Id(id) => t.users.get(&id),
            UserWhere::Email(email) => t
                .users_by_email
                .get(&email.trim().to_lowercase())
                .and_then(|id| t.users.get(id)),
        }
    }

    pub(crate) fn insert(t: &mut Tables, data: NewUser) -> User {
        let email = data.email.trim().to_lowercase();
        let user = User {
            id: data.id.unwrap_or_else(Uuid::new_v4),
            email: email.clone(),
            password_hash: data.password_hash,
            display_name: data.display_name,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users_by_email.insert(email, user.id);
        t.users.insert(user.id, user.clone());
        user
    }
}
