//! In-memory store shared by the repositories.
//!
//! All tables live behind one `RwLock`. Repositories take short read or write
//! guards; composite operations (favorite toggle, unique registration,
//! seeding) hold a single write guard for the whole check-and-act.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::{auth::repo_types::User, favorites::repo_types::Favorite, recipes::repo_types::Recipe};

pub type Db = Arc<Store>;

/// A row plus its insertion sequence number, used as a stable tiebreaker
/// when two rows share a creation timestamp.
#[derive(Debug, Clone)]
pub struct Row<T> {
    pub seq: u64,
    pub data: T,
}

#[derive(Debug, Default)]
pub struct Tables {
    pub users: HashMap<Uuid, User>,
    /// lowercased email -> user id
    pub users_by_email: HashMap<String, Uuid>,
    pub recipes: HashMap<Uuid, Row<Recipe>>,
    pub favorites: HashMap<Uuid, Row<Favorite>>,
    /// "userId:recipeId" -> favorite id
    pub favorites_by_pair: HashMap<String, Uuid>,
    next_seq: u64,
}

impl Tables {
    pub fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

#[derive(Debug, Default)]
pub struct Store {
    tables: RwLock<Tables>,
}

impl Store {
    pub fn new() -> Db {
        Arc::new(Self::default())
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().await
    }
}

/// Synthetic key enforcing one favorite per (user, recipe) pair.
pub fn composite_key(user_id: Uuid, recipe_id: Uuid) -> String {
    format!("{}:{}", user_id, recipe_id)
}
