//! The built-in recipe catalog.
//!
//! Shown when no search is active and used as the local fallback when the
//! remote search index is unavailable.

use std::sync::LazyLock;

use crate::types::{Ingredient, Recipe, RecipeId};

/// Home screen rows, in display order.
pub const CATEGORIES: &[&str] = &[
    "15-Min Dinners",
    "Budget Friendly",
    "High Protein",
    "Weekend Specials",
];

static RECIPES: LazyLock<Vec<Recipe>> = LazyLock::new(|| {
    vec![
        entry(
            "1",
            "Speedy Tomato Pasta",
            "A quick and delicious pasta dish perfect for weeknights.",
            ("5 mins", "10 mins", 2),
            &[
                ("Pasta", "200", "g"),
                ("Canned Tomatoes", "1", "can"),
                ("Garlic", "2", "cloves"),
                ("Olive Oil", "1", "tbsp"),
                ("Basil", "a few", "leaves"),
            ],
            &[
                "Cook pasta according to package directions.",
                "While pasta cooks, heat olive oil in a pan. Add minced garlic and cook until fragrant.",
                "Pour in canned tomatoes, season with salt and pepper. Simmer for 5-7 minutes.",
                "Drain pasta and add to the sauce. Toss to combine. Serve topped with fresh basil.",
            ],
            "https://picsum.photos/seed/modernpasta/400/300",
            "15-Min Dinners",
        ),
        entry(
            "2",
            "Hearty Lentil Soup",
            "Nutritious and budget-friendly lentil soup, perfect for a cozy meal.",
            ("10 mins", "30 mins", 4),
            &[
                ("Red Lentils", "1", "cup"),
                ("Vegetable Broth", "4", "cups"),
                ("Onion", "1", "medium"),
                ("Carrots", "2", "medium"),
                ("Celery", "2", "stalks"),
                ("Cumin", "1", "tsp"),
            ],
            &[
                "Chop onion, carrots, and celery.",
                "Sauté vegetables in a large pot until softened.",
                "Rinse lentils and add to the pot along with vegetable broth and cumin.",
                "Bring to a boil, then reduce heat and simmer for 20-25 minutes, or until lentils are tender.",
                "Season with salt and pepper to taste.",
            ],
            "https://picsum.photos/seed/veggiesoup/400/300",
            "Budget Friendly",
        ),
        entry(
            "3",
            "Grilled Chicken Salad with Avocado",
            "A light, satisfying, and protein-packed salad with creamy avocado.",
            ("15 mins", "10 mins", 2),
            &[
                ("Chicken Breast", "2", "pcs"),
                ("Mixed Greens", "100", "g"),
                ("Cherry Tomatoes", "1/2", "cup"),
                ("Cucumber", "1/2", "medium"),
                ("Avocado", "1", "small"),
                ("Olive Oil", "2", "tbsp"),
                ("Lemon Juice", "1", "tbsp"),
            ],
            &[
                "Season chicken breasts and grill until cooked through. Let rest and slice.",
                "Chop tomatoes, cucumber, and slice avocado.",
                "In a large bowl, combine mixed greens, tomatoes, and cucumber.",
                "Top with sliced grilled chicken and avocado.",
                "Whisk together olive oil and lemon juice for dressing. Drizzle over salad.",
            ],
            "https://picsum.photos/seed/freshsalad/400/300",
            "High Protein",
        ),
        entry(
            "4",
            "Gourmet Beef Tacos with Chipotle Crema",
            "Elevate taco night with flavorful beef tacos and a smoky chipotle crema.",
            ("20 mins", "25 mins", 4),
            &[
                ("Ground Beef", "500", "g"),
                ("Taco Shells", "12", "pcs"),
                ("Avocado", "1", "large"),
                ("Red Onion", "1/2", "small"),
                ("Cilantro", "1/4", "cup"),
                ("Lime", "1", ""),
                ("Sour Cream", "1/2", "cup"),
                ("Chipotle in Adobo", "1", "tbsp, minced"),
            ],
            &[
                "Brown ground beef, drain excess fat. Season with taco seasoning.",
                "Dice avocado and red onion. Chop cilantro.",
                "For chipotle crema: mix sour cream with minced chipotle and a squeeze of lime.",
                "Warm taco shells according to package instructions.",
                "Assemble tacos with beef, avocado, red onion, cilantro, and a drizzle of chipotle crema.",
            ],
            "https://picsum.photos/seed/spicytacos/400/300",
            "Weekend Specials",
        ),
    ]
});

#[allow(clippy::too_many_arguments)]
fn entry(
    id: &str,
    name: &str,
    description: &str,
    (prep_time, cook_time, servings): (&str, &str, u32),
    ingredients: &[(&str, &str, &str)],
    instructions: &[&str],
    image_url: &str,
    category: &str,
) -> Recipe {
    Recipe {
        id: RecipeId::new(id),
        name: name.to_owned(),
        description: description.to_owned(),
        prep_time: prep_time.to_owned(),
        cook_time: cook_time.to_owned(),
        servings,
        ingredients: ingredients
            .iter()
            .map(|(n, q, u)| Ingredient::new(n, q, u))
            .collect(),
        instructions: instructions.iter().map(|s| (*s).to_owned()).collect(),
        image_url: image_url.to_owned(),
        category: Some(category.to_owned()),
        ai_generated: false,
        diet_tags: std::collections::BTreeSet::new(),
    }
}

/// Every catalog recipe, in catalog order.
#[must_use]
pub fn all() -> &'static [Recipe] {
    &RECIPES
}

/// Look up a catalog recipe by id.
#[must_use]
pub fn find(id: &RecipeId) -> Option<&'static Recipe> {
    RECIPES.iter().find(|r| &r.id == id)
}

/// Local full-text fallback: case-insensitive substring match on name and
/// description.
#[must_use]
pub fn search_local(term: &str) -> Vec<Recipe> {
    let needle = term.trim().to_lowercase();
    RECIPES
        .iter()
        .filter(|r| r.matches_lowercase(&needle))
        .cloned()
        .collect()
}

/// Catalog recipes grouped into the home screen rows.
///
/// Every category in [`CATEGORIES`] is present, possibly with no recipes.
#[must_use]
pub fn by_category() -> Vec<(&'static str, Vec<&'static Recipe>)> {
    CATEGORIES
        .iter()
        .map(|&category| {
            let recipes = RECIPES
                .iter()
                .filter(|r| r.category.as_deref() == Some(category))
                .collect();
            (category, recipes)
        })
        .collect()
}
