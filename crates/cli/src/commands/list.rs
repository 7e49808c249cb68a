//! Shopping list.

use std::fmt::Write as _;

use cookmate_app::AppState;
use cookmate_app::routes::Screen;
use cookmate_core::{RecipeId, ShoppingItemId, ShoppingListItem, catalog};

use super::{CliError, ensure_screen};

fn item_line(item: &ShoppingListItem) -> String {
    let mark = if item.is_checked { "x" } else { " " };
    let mut line = format!("[{mark}] {}  {}", item.name, item.quantity);
    if let Some(unit) = &item.unit {
        let _ = write!(line, " {unit}");
    }
    let _ = write!(line, "  ({})", item.id);
    line
}

/// Pending items first, then the completed ones.
pub fn show(state: &AppState) -> Result<String, CliError> {
    ensure_screen(state, Screen::ShoppingList)?;

    let list = state.shopping_list().snapshot();
    if list.items.is_empty() {
        return Ok("Your shopping list is empty.".to_string());
    }

    let mut out = String::from("To buy:\n");
    for item in list.pending() {
        let _ = writeln!(out, "  {}", item_line(item));
    }
    let mut completed = list.completed().peekable();
    if completed.peek().is_some() {
        out.push_str("Completed:\n");
        for item in completed {
            let _ = writeln!(out, "  {}", item_line(item));
        }
    }
    Ok(out.trim_end().to_string())
}

/// Add a manually entered item.
pub fn add(state: &AppState, name: &str, quantity: &str) -> Result<String, CliError> {
    ensure_screen(state, Screen::ShoppingList)?;

    match state.shopping_list().add_manual(name, quantity)? {
        Some(id) => Ok(format!("Added {} ({id}).", name.trim())),
        None => Ok("Nothing added: the item name is blank.".to_string()),
    }
}

/// Add every ingredient of a catalog recipe. Running it twice adds nothing
/// new.
pub fn add_recipe(state: &AppState, id: &str) -> Result<String, CliError> {
    ensure_screen(state, Screen::ShoppingList)?;

    let recipe_id = RecipeId::new(id);
    let recipe = catalog::find(&recipe_id).ok_or_else(|| CliError::UnknownRecipe(id.to_string()))?;

    let before = state.shopping_list().items().len();
    state.shopping_list().add_recipe(recipe)?;
    let added = state.shopping_list().items().len().saturating_sub(before);
    Ok(format!("Added {added} ingredients from {}.", recipe.name))
}

fn existing(state: &AppState, id: &str) -> Result<ShoppingItemId, CliError> {
    let id = ShoppingItemId::new(id);
    if state.shopping_list().items().iter().any(|item| item.id == id) {
        Ok(id)
    } else {
        Err(CliError::UnknownItem(id.to_string()))
    }
}

pub fn remove(state: &AppState, id: &str) -> Result<String, CliError> {
    ensure_screen(state, Screen::ShoppingList)?;
    let id = existing(state, id)?;
    state.shopping_list().remove_item(&id)?;
    Ok(format!("Removed {id}."))
}

/// Flip an item between pending and completed.
pub fn toggle(state: &AppState, id: &str) -> Result<String, CliError> {
    ensure_screen(state, Screen::ShoppingList)?;
    let id = existing(state, id)?;
    state.shopping_list().toggle_item(&id)?;
    show(state)
}

pub fn clear(state: &AppState) -> Result<String, CliError> {
    ensure_screen(state, Screen::ShoppingList)?;
    state.shopping_list().clear_list()?;
    Ok("Shopping list cleared.".to_string())
}
