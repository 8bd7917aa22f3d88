//! Demo content inserted into an empty store at startup.

use tracing::info;

use crate::auth::password::hash_password;
use crate::auth::repo_types::{NewUser, User};
use crate::db::Db;
use crate::recipes::repo_types::{Ingredient, NewRecipe, Recipe, RecipeData};

pub const DEMO_EMAIL: &str = "chef@example.com";
pub const DEMO_PASSWORD: &str = "password123";
pub const DEMO_DISPLAY_NAME: &str = "Demo Chef";

/// Seed the demo user and recipes if there are no users yet.
///
/// The emptiness check and the inserts share one write guard, so concurrent
/// callers seed at most once. Returns `true` when this call seeded.
pub async fn seed_if_empty(db: &Db) -> anyhow::Result<bool> {
    if User::count(db).await > 0 {
        return Ok(false);
    }
    let password_hash = hash_password(DEMO_PASSWORD)?;

    let mut t = db.write().await;
    if !t.users.is_empty() {
        return Ok(false);
    }
    let user = User::insert(
        &mut t,
        NewUser {
            id: None,
            email: DEMO_EMAIL.into(),
            password_hash,
            display_name: DEMO_DISPLAY_NAME.into(),
        },
    );
    let recipes = demo_recipes();
    let count = recipes.len();
    for data in recipes {
        Recipe::insert(
            &mut t,
            NewRecipe {
                id: None,
                author_id: user.id,
                data,
            },
        );
    }

    info!(user_id = %user.id, recipes = count, "seeded demo data");
    Ok(true)
}

fn ing(quantity: &str, item: &str) -> Ingredient {
    Ingredient {
        quantity: quantity.into(),
        item: item.into(),
    }
}

fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

fn demo_recipes() -> Vec<RecipeData> {
    vec![
        RecipeData {
            title: "Classic Spaghetti Carbonara".into(),
            ingredients: vec![
                ing("400g", "spaghetti"),
                ing("4", "eggs"),
                ing("100g", "Pecorino Romano cheese"),
                ing("100g", "guanciale"),
                ing("1 tsp", "black pepper"),
            ],
            instructions: "1. Cook spaghetti in salted boiling water.\n\
                2. While pasta cooks, whisk eggs with grated cheese and pepper.\n\
                3. Fry guanciale until crispy.\n\
                4. Toss hot pasta with egg mixture and guanciale.\n\
                5. Add reserved pasta water to create creamy sauce.\n\
                6. Serve immediately with extra cheese."
                .into(),
            cooking_time: 20,
            servings: 4,
            tags: tags(&["Italian", "Dinner"]),
        },
        RecipeData {
            title: "Chicken Tikka Masala".into(),
            ingredients: vec![
                ing("500g", "chicken breast"),
                ing("1 can", "coconut milk"),
                ing("400g", "canned tomatoes"),
                ing("2 tbsp", "garam masala"),
                ing("1", "onion"),
            ],
            instructions: "1. Marinate chicken in yogurt and spices.\n\
                2. Grill marinated chicken until cooked.\n\
                3. Sauté onions with spices.\n\
                4. Add tomatoes and coconut milk, simmer.\n\
                5. Add grilled chicken to sauce.\n\
                6. Simmer for 15 minutes."
                .into(),
            cooking_time: 45,
            servings: 4,
            tags: tags(&["Asian", "Dinner"]),
        },
        RecipeData {
            title: "Vegan Buddha Bowl".into(),
            ingredients: vec![
                ing("1 cup", "quinoa"),
                ing("1", "sweet potato"),
                ing("1 cup", "chickpeas"),
                ing("1", "avocado"),
                ing("2 tbsp", "tahini"),
            ],
            instructions: "1. Roast chickpeas and sweet potato cubes.\n\
                2. Cook quinoa according to package.\n\
                3. Slice avocado and prepare vegetables.\n\
                4. Whisk tahini with lemon and water for dressing.\n\
                5. Assemble bowls with quinoa, roasted veggies, and toppings."
                .into(),
            cooking_time: 30,
            servings: 2,
            tags: tags(&["Vegetarian", "Vegan", "Lunch"]),
        },
        RecipeData {
            title: "Healthy Breakfast Smoothie".into(),
            ingredients: vec![
                ing("1 cup", "spinach"),
                ing("1", "banana"),
                ing("1/2 cup", "frozen berries"),
                ing("1 cup", "almond milk"),
                ing("1 tbsp", "chia seeds"),
            ],
            instructions: "1. Add spinach and almond milk to blender.\n\
                2. Add banana and berries.\n\
                3. Blend until smooth.\n\
                4. Add chia seeds and pulse briefly.\n\
                5. Pour into glass and serve."
                .into(),
            cooking_time: 5,
            servings: 1,
            tags: tags(&["Vegan", "Breakfast", "Vegetarian"]),
        },
    ]
}
