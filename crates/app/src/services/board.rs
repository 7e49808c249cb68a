//! The recipes currently on screen.
//!
//! Search replaces the board; generation prepends to it. Nothing here is
//! persisted.

use std::sync::Arc;

use tokio::sync::watch;

use cookmate_core::{Recipe, catalog};

/// Shared, observable list of visible recipes.
#[derive(Clone)]
pub struct RecipeBoard {
    recipes: Arc<watch::Sender<Vec<Recipe>>>,
}

impl Default for RecipeBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipeBoard {
    /// A board showing the full catalog.
    #[must_use]
    pub fn new() -> Self {
        let (recipes, _) = watch::channel(catalog::all().to_vec());
        Self {
            recipes: Arc::new(recipes),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Recipe> {
        self.recipes.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Recipe>> {
        self.recipes.subscribe()
    }

    /// Replace every visible recipe.
    pub fn replace(&self, recipes: Vec<Recipe>) {
        self.recipes.send_replace(recipes);
    }

    /// Put `recipe` in front of the current list.
    pub fn prepend(&self, recipe: Recipe) {
        self.recipes.send_modify(|recipes| recipes.insert(0, recipe));
    }
}
