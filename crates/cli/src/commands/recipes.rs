//! Browsing, searching and generating recipes.

use std::fmt::Write as _;

use cookmate_app::AppState;
use cookmate_app::routes::Screen;
use cookmate_app::services::GenerationInputs;
use cookmate_core::{RecipeId, catalog};

use super::{CliError, ensure_screen, recipe_detail, recipe_line};

/// Home screen: the catalog grouped into rows.
pub fn catalog(state: &AppState) -> Result<String, CliError> {
    ensure_screen(state, Screen::Home)?;

    let mut out = String::new();
    for (category, recipes) in catalog::by_category() {
        let _ = writeln!(out, "{category}");
        if recipes.is_empty() {
            let _ = writeln!(out, "  (no recipes yet)");
        }
        for recipe in recipes {
            let _ = writeln!(out, "  {}", recipe_line(recipe));
        }
    }
    Ok(out.trim_end().to_string())
}

/// Full card for one recipe.
pub fn show(state: &AppState, id: &str) -> Result<String, CliError> {
    ensure_screen(state, Screen::Cookbook)?;

    let id = RecipeId::new(id);
    state
        .board()
        .snapshot()
        .into_iter()
        .find(|r| r.id == id)
        .map(|recipe| recipe_detail(&recipe))
        .ok_or_else(|| CliError::UnknownRecipe(id.to_string()))
}

/// Cookbook search, bypassing the keystroke debounce.
pub async fn search(state: &AppState, term: String) -> Result<String, CliError> {
    ensure_screen(state, Screen::Cookbook)?;

    let search = state.search();
    search.commit(term).await;

    let snapshot = search.snapshot();
    let mut out = String::new();
    if let Some(notice) = &snapshot.notice {
        let _ = writeln!(out, "{notice}");
    }
    for recipe in search.board().snapshot() {
        let _ = writeln!(out, "{}", recipe_line(&recipe));
    }
    Ok(out.trim_end().to_string())
}

/// Generate a recipe from the user's profile and the given hints.
///
/// With `add_to_list` the new recipe's ingredients go straight onto the
/// shopping list.
pub async fn generate(
    state: &AppState,
    inputs: GenerationInputs,
    add_to_list: bool,
) -> Result<String, CliError> {
    ensure_screen(state, Screen::Cookbook)?;

    let generation = state.generation();
    generation.open_dialog();
    generation.set_inputs(inputs);
    let recipe = generation.generate().await?;

    let mut out = recipe_detail(&recipe);
    if add_to_list {
        state.shopping_list().add_recipe(&recipe)?;
        let _ = writeln!(out, "\nAdded {} ingredients to the shopping list.", recipe.ingredients.len());
    }
    Ok(out.trim_end().to_string())
}
