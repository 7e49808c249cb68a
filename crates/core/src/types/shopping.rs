//! Shopping list entries.

use serde::{Deserialize, Serialize};

use super::id::{RecipeId, ShoppingItemId};

/// A purchasable item on the shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListItem {
    pub id: ShoppingItemId,
    pub name: String,
    pub quantity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub is_checked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<RecipeId>,
}

impl ShoppingListItem {
    /// Key used to recognise the same ingredient of the same recipe.
    ///
    /// Returns `None` for manually added items, which never collide.
    #[must_use]
    pub fn recipe_key(&self) -> Option<(String, RecipeId)> {
        self.recipe_id
            .as_ref()
            .map(|recipe_id| (self.name.clone(), recipe_id.clone()))
    }
}

/// An item about to be added; the list assigns `id` and `is_checked`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShoppingItem {
    pub name: String,
    pub quantity: String,
    pub unit: Option<String>,
    pub recipe_id: Option<RecipeId>,
}

impl NewShoppingItem {
    /// Quantity used when the user leaves the field blank.
    pub const DEFAULT_QUANTITY: &'static str = "1";

    /// Build a manually entered item.
    ///
    /// Trims both fields; returns `None` for a blank name and falls back to
    /// a quantity of `1`.
    #[must_use]
    pub fn manual(name: &str, quantity: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let quantity = match quantity.trim() {
            "" => Self::DEFAULT_QUANTITY,
            q => q,
        };
        Some(Self {
            name: name.to_owned(),
            quantity: quantity.to_owned(),
            unit: None,
            recipe_id: None,
        })
    }

    /// Attach the item to a list under the given id, unchecked.
    #[must_use]
    pub fn into_item(self, id: ShoppingItemId) -> ShoppingListItem {
        ShoppingListItem {
            id,
            name: self.name,
            quantity: self.quantity,
            unit: self.unit,
            is_checked: false,
            recipe_id: self.recipe_id,
        }
    }
}
