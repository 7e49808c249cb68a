//! Types for the Algolia query endpoint and the recipe index documents.

use serde::{Deserialize, Serialize};

use cookmate_core::{Ingredient, Recipe, RecipeId};

use crate::schema::{diet_tags, string_or_number};

/// Request body for `POST /1/indexes/{index}/query`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub hits_per_page: u32,
}

/// Response body of the query endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub hits: Vec<RecipeHit>,
    #[serde(default)]
    pub nb_hits: Option<u64>,
    #[serde(default, rename = "processingTimeMS")]
    pub processing_time_ms: Option<u64>,
}

/// A recipe document stored in the index.
///
/// Only `objectID` and `name` are required; everything else falls back to
/// an empty value.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeHit {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prep_time: String,
    #[serde(default)]
    pub cook_time: String,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub ingredients: Vec<HitIngredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub diet_tags: Vec<String>,
}

/// Ingredient line of an index document.
#[derive(Debug, Clone, Deserialize)]
pub struct HitIngredient {
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub quantity: String,
    #[serde(default)]
    pub unit: String,
}

impl RecipeHit {
    /// Map the document onto a recipe.
    ///
    /// Documents without an image get a placeholder seeded by their id.
    #[must_use]
    pub fn into_recipe(self) -> Recipe {
        let image_url = self
            .image_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| format!("https://picsum.photos/seed/{}/400/300", self.object_id));

        Recipe {
            id: RecipeId::new(self.object_id),
            name: self.name,
            description: self.description,
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            servings: self.servings.unwrap_or(1),
            ingredients: self
                .ingredients
                .into_iter()
                .map(|i| Ingredient {
                    name: i.name,
                    quantity: i.quantity,
                    unit: i.unit,
                })
                .collect(),
            instructions: self.instructions,
            image_url,
            category: self.category,
            ai_generated: false,
            diet_tags: diet_tags(&self.diet_tags),
        }
    }
}

#[cfg(test)]
mod tests {
    use cookmate_core::DietRequirement;

    use super::*;

    #[test]
    fn test_full_hit_maps_to_recipe() {
        let json = r#"{
            "objectID": "r-42",
            "name": "Shakshuka",
            "description": "Eggs poached in spiced tomato sauce.",
            "prepTime": "10 mins",
            "cookTime": "20 mins",
            "servings": 3,
            "ingredients": [{"name": "Eggs", "quantity": 4, "unit": ""}],
            "instructions": ["Simmer sauce.", "Crack in eggs."],
            "imageUrl": "https://cdn.example.com/shakshuka.jpg",
            "category": "Weekend Specials",
            "dietTags": ["Vegetarian"],
            "_highlightResult": {}
        }"#;
        let recipe = serde_json::from_str::<RecipeHit>(json)
            .expect("deserialize")
            .into_recipe();

        assert_eq!(recipe.id.as_str(), "r-42");
        assert_eq!(recipe.servings, 3);
        assert_eq!(recipe.ingredients[0].quantity, "4");
        assert_eq!(recipe.image_url, "https://cdn.example.com/shakshuka.jpg");
        assert!(recipe.diet_tags.contains(&DietRequirement::Vegetarian));
        assert!(!recipe.ai_generated);
    }

    #[test]
    fn test_sparse_hit_gets_defaults() {
        let recipe = serde_json::from_str::<RecipeHit>(r#"{"objectID":"7","name":"Toast"}"#)
            .expect("deserialize")
            .into_recipe();

        assert_eq!(recipe.servings, 1);
        assert!(recipe.ingredients.is_empty());
        assert_eq!(recipe.image_url, "https://picsum.photos/seed/7/400/300");
        assert_eq!(recipe.category, None);
    }

    #[test]
    fn test_hit_without_name_is_rejected() {
        assert!(serde_json::from_str::<RecipeHit>(r#"{"objectID":"7"}"#).is_err());
    }

    #[test]
    fn test_request_serialization() {
        let request = SearchRequest {
            query: "pasta".to_string(),
            hits_per_page: 20,
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value, serde_json::json!({"query": "pasta", "hitsPerPage": 20}));
    }
}
