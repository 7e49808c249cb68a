//! Recipes shown in the cookbook.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::id::RecipeId;
use super::preferences::DietRequirement;
use super::shopping::NewShoppingItem;

/// One ingredient line of a recipe.
///
/// `quantity` is free text ("200", "1/2", "a few").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: String,
    pub unit: String,
}

impl Ingredient {
    #[must_use]
    pub fn new(name: &str, quantity: &str, unit: &str) -> Self {
        Self {
            name: name.to_owned(),
            quantity: quantity.to_owned(),
            unit: unit.to_owned(),
        }
    }
}

/// A recipe, either from the built-in catalog, the search index or the
/// generative model.
///
/// Recipes are write-once values; nothing mutates them after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub description: String,
    /// e.g. "15 mins"
    pub prep_time: String,
    pub cook_time: String,
    pub servings: u32,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ai_generated: bool,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub diet_tags: BTreeSet<DietRequirement>,
}

impl Recipe {
    /// Case-insensitive substring match over name and description.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }

    /// Shopping list entries for every ingredient, tagged with this recipe.
    #[must_use]
    pub fn shopping_items(&self) -> Vec<NewShoppingItem> {
        self.ingredients
            .iter()
            .map(|ingredient| NewShoppingItem {
                name: ingredient.name.clone(),
                quantity: ingredient.quantity.clone(),
                unit: Some(ingredient.unit.clone()).filter(|u| !u.is_empty()),
                recipe_id: Some(self.id.clone()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn test_matches_lowercase() {
        let pasta = catalog::find(&RecipeId::new("1")).expect("catalog recipe");
        assert!(pasta.matches_lowercase("pasta"));
        assert!(pasta.matches_lowercase("weeknights"));
        assert!(!pasta.matches_lowercase("lentil"));
    }

    #[test]
    fn test_shopping_items_are_tagged() {
        let tacos = catalog::find(&RecipeId::new("4")).expect("catalog recipe");
        let items = tacos.shopping_items();
        assert_eq!(items.len(), tacos.ingredients.len());
        assert!(items.iter().all(|i| i.recipe_id.as_ref() == Some(&tacos.id)));

        // Lime has no unit in the catalog
        let lime = items.iter().find(|i| i.name == "Lime").expect("lime");
        assert_eq!(lime.unit, None);
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let recipe = Recipe {
            id: RecipeId::new("x"),
            name: "Toast".to_string(),
            description: "Bread, but warm.".to_string(),
            prep_time: "1 min".to_string(),
            cook_time: "2 mins".to_string(),
            servings: 1,
            ingredients: vec![Ingredient::new("Bread", "1", "slice")],
            instructions: vec!["Toast it.".to_string()],
            image_url: "https://example.com/toast.jpg".to_string(),
            category: None,
            ai_generated: false,
            diet_tags: BTreeSet::new(),
        };
        let value = serde_json::to_value(&recipe).expect("serialize");
        assert!(value.get("category").is_none());
        assert!(value.get("aiGenerated").is_none());
        assert!(value.get("dietTags").is_none());
        assert_eq!(value["prepTime"], "1 min");
    }
}
