use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{Db, Row, Tables};
use crate::favorites::repo_types::Favorite;
use crate::recipes::repo_types::{
    AuthorWrite, NewRecipe, Recipe, RecipeData, RecipeFindMany, RecipeOrderBy,
};

impl Recipe {
    pub async fn find_unique(db: &Db, id: Uuid) -> Option<Recipe> {
        db.read().await.recipes.get(&id).map(|row| row.data.clone())
    }

    /// Recipes in insertion order unless `order_by` says otherwise, then
    /// offset by `skip` and capped at `take`.
    pub async fn find_many(db: &Db, args: RecipeFindMany) -> Vec<Recipe> {
        let t = db.read().await;
        let mut rows: Vec<&Row<Recipe>> = t
            .recipes
            .values()
            .filter(|row| args.author_id.map_or(true, |a| row.data.author_id == a))
            .collect();

        match args.order_by {
            Some(RecipeOrderBy::CreatedAtDesc) => rows.sort_by(|a, b| {
                b.data
                    .created_at
                    .cmp(&a.data.created_at)
                    .then(b.seq.cmp(&a.seq))
            }),
            None => rows.sort_by_key(|row| row.seq),
        }

        rows.into_iter()
            .skip(args.skip.unwrap_or(0))
            .take(args.take.unwrap_or(usize::MAX))
            .map(|row| row.data.clone())
            .collect()
    }

    pub async fn create(db: &Db, new: NewRecipe) -> Recipe {
        let mut t = db.write().await;
        Self::insert(&mut t, new)
    }

    /// Replace the editable fields, keeping id, author and creation time.
    pub async fn update(db: &Db, id: Uuid, data: RecipeData) -> Option<Recipe> {
        let mut t = db.write().await;
        Self::apply(&mut t, id, data)
    }

    /// Remove a recipe and the favorites pointing at it. No ownership check.
    pub async fn delete(db: &Db, id: Uuid) -> Option<Recipe> {
        let mut t = db.write().await;
        Self::remove(&mut t, id)
    }

    /// `update` that only succeeds for the author. The ownership check and
    /// the write share one guard.
    pub async fn update_by_author(
        db: &Db,
        id: Uuid,
        author_id: Uuid,
        data: RecipeData,
    ) -> AuthorWrite<Recipe> {
        let mut t = db.write().await;
        if let Some(denied) = Self::check_author(&t, id, author_id) {
            return denied;
        }
        Self::apply(&mut t, id, data).map_or(AuthorWrite::NotFound, AuthorWrite::Done)
    }

    /// `delete` that only succeeds for the author, under one guard.
    pub async fn delete_by_author(db: &Db, id: Uuid, author_id: Uuid) -> AuthorWrite<Recipe> {
        let mut t = db.write().await;
        if let Some(denied) = Self::check_author(&t, id, author_id) {
            return denied;
        }
        Self::remove(&mut t, id).map_or(AuthorWrite::NotFound, AuthorWrite::Done)
    }

    fn check_author<T>(t: &Tables, id: Uuid, author_id: Uuid) -> Option<AuthorWrite<T>> {
        match t.recipes.get(&id) {
            None => Some(AuthorWrite::NotFound),
            Some(row) if row.data.author_id != author_id => Some(AuthorWrite::NotAuthor {
                author_id: row.data.author_id,
            }),
            Some(_) => None,
        }
    }

    fn apply(t: &mut Tables, id: Uuid, data: RecipeData) -> Option<Recipe> {
        let row = t.recipes.get_mut(&id)?;
        let r = &mut row.data;
        r.title = data.title;
        r.ingredients = data.ingredients;
        r.instructions = data.instructions;
        r.cooking_time = data.cooking_time;
        r.servings = data.servings;
        r.tags = data.tags;
        r.updated_at = OffsetDateTime::now_utc();
        Some(r.clone())
    }

    fn remove(t: &mut Tables, id: Uuid) -> Option<Recipe> {
        let removed = t.recipes.remove(&id)?.data;
        let orphaned: Vec<Uuid> = t
            .favorites
            .values()
            .filter(|row| row.data.recipe_id == id)
            .map(|row| row.data.id)
            .collect();
        for fav_id in orphaned {
            Favorite::remove(t, fav_id);
        }
        Some(removed)
    }

    pub(crate) fn insert(t: &mut Tables, new: NewRecipe) -> Recipe {
        let now = OffsetDateTime::now_utc();
        let d = new.data;
        let recipe = Recipe {
            id: new.id.unwrap_or_else(Uuid::new_v4),
            title: d.title,
            ingredients: d.ingredients,
            instructions: d.instructions,
            cooking_time: d.cooking_time,
            servings: d.servings,
            tags: d.tags,
            author_id: new.author_id,
            created_at: now,
            updated_at: now,
        };
        let seq = t.next_seq();
        t.recipes.insert(
            recipe.id,
            Row {
                seq,
                data: recipe.clone(),
            },
        );
        recipe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use crate::recipes::repo_types::Ingredient;

    fn data(title: &str) -> RecipeData {
        RecipeData {
            title: title.into(),
            ingredients: vec![Ingredient {
                quantity: "1 slice".into(),
                item: "bread".into(),
            }],
            instructions: "Toast it.".into(),
            cooking_time: 5,
            servings: 1,
            tags: vec!["breakfast".into()],
        }
    }

    async fn create(db: &Db, author: Uuid, title: &str) -> Recipe {
        Recipe::create(
            db,
            NewRecipe {
                id: None,
                author_id: author,
                data: data(title),
            },
        )
        .await
    }

    #[tokio::test]
    async fn find_many_orders_filters_and_pages() {
        let db = Store::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let a = create(&db, alice, "A").await;
        let b = create(&db, bob, "B").await;
        let c = create(&db, alice, "C").await;

        let titles = |v: Vec<Recipe>| v.into_iter().map(|r| r.title).collect::<Vec<_>>();

        assert_eq!(titles(Recipe::find_many(&db, RecipeFindMany::default()).await), ["A", "B", "C"]);

        let newest = RecipeFindMany {
            order_by: Some(RecipeOrderBy::CreatedAtDesc),
            ..Default::default()
        };
        assert_eq!(titles(Recipe::find_many(&db, newest.clone()).await), ["C", "B", "A"]);

        let by_alice = RecipeFindMany {
            author_id: Some(alice),
            ..newest.clone()
        };
        let mine = Recipe::find_many(&db, by_alice).await;
        assert_eq!(mine.iter().map(|r| r.id).collect::<Vec<_>>(), [c.id, a.id]);

        let page = RecipeFindMany {
            skip: Some(1),
            take: Some(1),
            ..newest
        };
        let page = Recipe::find_many(&db, page).await;
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, b.id);
    }

    #[tokio::test]
    async fn update_keeps_identity() {
        let db = Store::new();
        let author = Uuid::new_v4();
        let original = create(&db, author, "Toast").await;

        let mut edit = data("Better Toast");
        edit.servings = 2;
        let updated = Recipe::update(&db, original.id, edit).await.expect("exists");
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.author_id, author);
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.updated_at >= original.updated_at);
        assert_eq!(Recipe::find_unique(&db, original.id).await.unwrap().title, "Better Toast");

        assert!(Recipe::update(&db, Uuid::new_v4(), data("x")).await.is_none());
    }

    #[tokio::test]
    async fn delete_removes_recipe_and_its_favorites() {
        let db = Store::new();
        let author = Uuid::new_v4();
        let fan = Uuid::new_v4();
        let keep = create(&db, author, "Keep").await;
        let gone = create(&db, author, "Gone").await;
        Favorite::create(&db, fan, gone.id).await;
        Favorite::create(&db, fan, keep.id).await;

        assert!(Recipe::delete(&db, gone.id).await.is_some());
        assert!(Recipe::find_unique(&db, gone.id).await.is_none());
        let left = Recipe::find_many(&db, RecipeFindMany::default()).await;
        assert_eq!(left.len(), 1);
        assert_eq!(Favorite::count(&db, Some(gone.id)).await, 0);
        assert!(Favorite::find_unique(&db, fan, gone.id).await.is_none());
        assert_eq!(Favorite::count(&db, Some(keep.id)).await, 1);

        assert!(Recipe::delete(&db, gone.id).await.is_none());
    }

    #[tokio::test]
    async fn author_only_writes() {
        let db = Store::new();
        let (author, other) = (Uuid::new_v4(), Uuid::new_v4());
        let r = create(&db, author, "Toast").await;

        assert_eq!(
            Recipe::update_by_author(&db, r.id, other, data("Hijacked")).await,
            AuthorWrite::NotAuthor { author_id: author }
        );
        assert_eq!(
            Recipe::delete_by_author(&db, r.id, other).await,
            AuthorWrite::NotAuthor { author_id: author }
        );
        assert_eq!(Recipe::find_unique(&db, r.id).await.unwrap().title, "Toast");

        let AuthorWrite::Done(updated) =
            Recipe::update_by_author(&db, r.id, author, data("Better Toast")).await
        else {
            panic!("author update should succeed");
        };
        assert_eq!(updated.id, r.id);

        assert!(matches!(
            Recipe::delete_by_author(&db, r.id, author).await,
            AuthorWrite::Done(_)
        ));
        assert_eq!(Recipe::delete_by_author(&db, r.id, author).await, AuthorWrite::NotFound);
        assert_eq!(
            Recipe::update_by_author(&db, r.id, author, data("Gone")).await,
            AuthorWrite::NotFound
        );
    }

    #[tokio::test]
    async fn concurrent_author_deletes_succeed_once() {
        let db = Store::new();
        let author = Uuid::new_v4();
        let r = create(&db, author, "Toast").await;

        let (a, b) = tokio::join!(
            Recipe::delete_by_author(&db, r.id, author),
            Recipe::delete_by_author(&db, r.id, author)
        );
        let done = [a, b].into_iter().filter(|w| matches!(w, AuthorWrite::Done(_))).count();
        assert_eq!(done, 1);
    }
}
