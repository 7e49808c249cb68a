//! Command implementations.
//!
//! Every command returns the text to print; `main` does the printing.

pub mod list;
pub mod prefs;
pub mod recipes;
pub mod session;

use std::fmt::Write as _;

use thiserror::Error;

use cookmate_app::routes::{RouteDecision, Screen};
use cookmate_app::services::GenerationError;
use cookmate_app::storage::StorageError;
use cookmate_app::AppState;
use cookmate_core::Recipe;

/// Errors reported to the user.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{}", .0.user_message())]
    Generation(#[from] GenerationError),

    #[error("Not signed in. Run `cookmate login <provider>` first.")]
    NotSignedIn,

    #[error("Onboarding is not complete. Run `cookmate onboard` first.")]
    OnboardingIncomplete,

    #[error("Onboarding is already complete. Run `cookmate prefs reset-onboarding` to start over.")]
    OnboardingComplete,

    #[error("No recipe with id '{0}'")]
    UnknownRecipe(String),

    #[error("No shopping list item with id '{0}'")]
    UnknownItem(String),
}

/// Fail unless the navigation gate would render `screen`.
///
/// # Errors
///
/// Returns the reason the screen is not reachable.
pub fn ensure_screen(state: &AppState, screen: Screen) -> Result<(), CliError> {
    match state.route(screen.path()) {
        RouteDecision::Render(_) => Ok(()),
        RouteDecision::Loading | RouteDecision::Redirect(Screen::Login) => {
            Err(CliError::NotSignedIn)
        }
        RouteDecision::Redirect(Screen::OnboardingDiet) => Err(CliError::OnboardingIncomplete),
        RouteDecision::Redirect(_) => Err(CliError::OnboardingComplete),
    }
}

/// One-line summary used in listings.
fn recipe_line(recipe: &Recipe) -> String {
    let mut line = format!(
        "[{}] {} - prep {}, cook {}, serves {}",
        recipe.id, recipe.name, recipe.prep_time, recipe.cook_time, recipe.servings
    );
    if recipe.ai_generated {
        line.push_str(" (AI)");
    }
    line
}

/// Full recipe card.
fn recipe_detail(recipe: &Recipe) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  [{}]", recipe.name, recipe.id);
    if let Some(category) = &recipe.category {
        let _ = writeln!(out, "Category: {category}");
    }
    let _ = writeln!(out, "{}", recipe.description);
    let _ = writeln!(
        out,
        "Prep: {}  Cook: {}  Serves: {}",
        recipe.prep_time, recipe.cook_time, recipe.servings
    );
    if !recipe.diet_tags.is_empty() {
        let tags: Vec<_> = recipe.diet_tags.iter().map(|d| d.label()).collect();
        let _ = writeln!(out, "Diets: {}", tags.join(", "));
    }
    let _ = writeln!(out, "Image: {}", recipe.image_url);

    let _ = writeln!(out, "\nIngredients:");
    for ingredient in &recipe.ingredients {
        let amount = [ingredient.quantity.as_str(), ingredient.unit.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(out, "  - {amount} {}", ingredient.name);
    }

    let _ = writeln!(out, "\nInstructions:");
    for (step, instruction) in recipe.instructions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {instruction}", step + 1);
    }
    out
}
