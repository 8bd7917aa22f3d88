use std::collections::HashMap;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{composite_key, Db, Row, Tables};
use crate::favorites::repo_types::{Favorite, FavoriteWhere};

impl Favorite {
    pub async fn find_unique(db: &Db, user_id: Uuid, recipe_id: Uuid) -> Option<Favorite> {
        let t = db.read().await;
        Self::lookup(&t, user_id, recipe_id).cloned()
    }

    /// A user's favorites, most recent first.
    pub async fn find_many_by_user(db: &Db, user_id: Uuid) -> Vec<Favorite> {
        let t = db.read().await;
        let mut rows: Vec<&Row<Favorite>> = t
            .favorites
            .values()
            .filter(|row| row.data.user_id == user_id)
            .collect();
        rows.sort_by(|a, b| b.seq.cmp(&a.seq));
        rows.into_iter().map(|row| row.data.clone()).collect()
    }

    /// Upsert on the `(user, recipe)` pair: a repeat replaces the earlier row,
    /// so a pair never has two favorites.
    pub async fn create(db: &Db, user_id: Uuid, recipe_id: Uuid) -> Favorite {
        let mut t = db.write().await;
        Self::insert(&mut t, user_id, recipe_id)
    }

    pub async fn delete(db: &Db, by: FavoriteWhere) -> Option<Favorite> {
        let mut t = db.write().await;
        let id = match by {
            FavoriteWhere::Id(id) => id,
            FavoriteWhere::Pair { user_id, recipe_id } => {
                *t.favorites_by_pair.get(&composite_key(user_id, recipe_id))?
            }
        };
        Self::remove(&mut t, id)
    }

    /// Number of favorites, optionally restricted to one recipe.
    pub async fn count(db: &Db, recipe_id: Option<Uuid>) -> usize {
        let t = db.read().await;
        match recipe_id {
            Some(rid) => t
                .favorites
                .values()
                .filter(|row| row.data.recipe_id == rid)
                .count(),
            None => t.favorites.len(),
        }
    }

    pub async fn counts_by_recipe(db: &Db) -> HashMap<Uuid, usize> {
        let t = db.read().await;
        let mut counts = HashMap::new();
        for row in t.favorites.values() {
            *counts.entry(row.data.recipe_id).or_insert(0) += 1;
        }
        counts
    }

    /// Flip the favorite state of a pair under one write guard.
    /// Returns `true` when the pair is favorited afterwards.
    pub async fn toggle(db: &Db, user_id: Uuid, recipe_id: Uuid) -> bool {
        let mut t = db.write().await;
        match Self::lookup(&t, user_id, recipe_id).map(|f| f.id) {
            Some(id) => {
                Self::remove(&mut t, id);
                false
            }
            None => {
                Self::insert(&mut t, user_id, recipe_id);
                true
            }
        }
    }

    fn lookup(t: &Tables, user_id: Uuid, recipe_id: Uuid) -> Option<&Favorite> {
        t.favorites_by_pair
            .get(&composite_key(user_id, recipe_id))
            .and_then(|id| t.favorites.get(id))
            .map(|row| &row.data)
    }

    fn insert(t: &mut Tables, user_id: Uuid, recipe_id: Uuid) -> Favorite {
        let fav = Favorite {
            id: Uuid::new_v4(),
            user_id,
            recipe_id,
            created_at: OffsetDateTime::now_utc(),
        };
        let seq = t.next_seq();
        if let Some(old) = t
            .favorites_by_pair
            .insert(composite_key(user_id, recipe_id), fav.id)
        {
            t.favorites.remove(&old);
        }
        t.favorites.insert(
            fav.id,
            Row {
                seq,
                data: fav.clone(),
            },
        );
        fav
    }

    pub(crate) fn remove(t: &mut Tables, id: Uuid) -> Option<Favorite> {
        let fav = t.favorites.remove(&id)?.data;
        let key = composite_key(fav.user_id, fav.recipe_id);
        // Only drop the index entry if it still points at this row.
        if t.favorites_by_pair.get(&key) == Some(&id) {
            t.favorites_by_pair.remove(&key);
        }
        Some(fav)
    }
}
