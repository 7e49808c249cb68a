//! Validation of recipe JSON produced by the generative model.
//!
//! The model is asked for a bare JSON object but sometimes wraps it in a
//! markdown fence anyway; [`parse_ai_recipe`] accepts both.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::debug;

use cookmate_core::{DietRequirement, Ingredient, Recipe, RecipeId};

/// Category assigned to every generated recipe.
pub const AI_CATEGORY: &str = "AI Generated";

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^```(\w*)?\s*\n?(.*?)\n?\s*```$").expect("Invalid regex"));

/// Ways a generated recipe can fail validation.
#[derive(Debug, Error)]
pub enum RecipeSchemaError {
    /// Not JSON, or a required field is missing or has the wrong type.
    #[error("invalid recipe JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// `recipeName` is blank.
    #[error("recipe name is empty")]
    MissingName,

    /// `servings` is zero.
    #[error("servings must be at least 1")]
    InvalidServings,
}

/// The JSON object the model is asked to produce.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRecipeResponse {
    pub recipe_name: String,
    pub description: String,
    pub servings: u32,
    pub prep_time: String,
    pub cook_time: String,
    pub ingredients: Vec<AiIngredient>,
    pub instructions: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub diet_tags: Vec<String>,
}

/// Ingredient line of a generated recipe.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AiIngredient {
    pub name: String,
    /// Models emit both `"2"` and `2`.
    #[serde(deserialize_with = "string_or_number")]
    pub quantity: String,
    pub unit: String,
}

impl AiRecipeResponse {
    /// Build the visible recipe.
    ///
    /// Diet tags that are not known diets are dropped.
    #[must_use]
    pub fn into_recipe(self, id: RecipeId, image_url: String) -> Recipe {
        Recipe {
            id,
            name: self.recipe_name,
            description: self.description,
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            servings: self.servings,
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
            category: Some(AI_CATEGORY.to_string()),
            ai_generated: true,
            diet_tags: diet_tags(&self.diet_tags),
        }
    }
}

/// Remove a surrounding markdown code fence, if present.
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    FENCE_RE
        .captures(trimmed)
        .and_then(|caps| caps.get(2))
        .map(|body| body.as_str().trim())
        .filter(|body| !body.is_empty())
        .unwrap_or(trimmed)
}

/// Parse and validate the model's reply.
///
/// # Errors
///
/// Returns an error if the reply is not a recipe object, or the recipe has
/// a blank name or zero servings.
pub fn parse_ai_recipe(raw: &str) -> Result<AiRecipeResponse, RecipeSchemaError> {
    let parsed: AiRecipeResponse = serde_json::from_str(strip_code_fence(raw))?;
    if parsed.recipe_name.trim().is_empty() {
        return Err(RecipeSchemaError::MissingName);
    }
    if parsed.servings == 0 {
        return Err(RecipeSchemaError::InvalidServings);
    }
    Ok(parsed)
}

/// Map free-form diet labels onto known diets, skipping unknown ones.
#[must_use]
pub fn diet_tags(raw: &[String]) -> BTreeSet<DietRequirement> {
    raw.iter()
        .filter_map(|tag| match tag.parse::<DietRequirement>() {
            Ok(diet) => Some(diet),
            Err(_) => {
                debug!(tag = %tag, "dropping unknown diet tag");
                None
            }
        })
        .collect()
}

/// Accept a JSON string or number as text.
///
/// # Errors
///
/// Returns an error for any other JSON type.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
