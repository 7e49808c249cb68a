//! Prompt construction for AI recipes.

use std::fmt::Write as _;

use rust_decimal::Decimal;

use cookmate_core::UserPreferences;

/// Ad hoc request fields typed into the generation dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationInputs {
    /// Ingredients to try to use, free text.
    pub ingredients: String,
    /// e.g. "dinner"
    pub meal_type: String,
    /// e.g. "spicy"
    pub cravings: String,
}

impl GenerationInputs {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ingredients.trim().is_empty()
            && self.meal_type.trim().is_empty()
            && self.cravings.trim().is_empty()
    }
}

/// Build the generation prompt. The output depends only on the arguments.
#[must_use]
pub fn build_recipe_prompt(preferences: &UserPreferences, inputs: &GenerationInputs) -> String {
    let mut prompt = String::from("You are a creative chef. Generate a unique recipe.\n");
    prompt.push_str(
        "The response MUST be a single JSON object. Do NOT use markdown like ```json ... ```.\n",
    );
    prompt.push_str(
        "The JSON object should have the following keys: 'recipeName' (string), \
         'description' (string, max 150 chars), 'servings' (number), \
         'prepTime' (string, e.g., '15 mins'), 'cookTime' (string, e.g., '20 mins'), \
         'ingredients' (array of objects with 'name', 'quantity', 'unit'), \
         'instructions' (array of strings), 'notes' (string, optional), \
         'dietTags' (array of DietRequirement strings, if applicable).\n",
    );

    let diets = preferences.restricting_diets();
    if !diets.is_empty() {
        let _ = writeln!(
            prompt,
            "It must be suitable for these diets: {}.",
            join_labels(diets.iter().map(|d| d.label()))
        );
    }
    let _ = writeln!(prompt, "It should be for {} servings.", preferences.servings);
    let _ = writeln!(
        prompt,
        "The cook should be a {} level.",
        preferences.chef_skill_level.label()
    );

    if preferences.kitchen_utensils.is_empty() {
        prompt.push_str("Assume basic kitchen utensils (pots, pans, knives) are available.\n");
    } else {
        let _ = writeln!(
            prompt,
            "The kitchen is equipped with at least the following: {}. \
             Consider these when suggesting cooking methods.",
            join_labels(preferences.kitchen_utensils.iter().map(|u| u.label()))
        );
    }

    if preferences.weekly_budget > Decimal::ZERO {
        let _ = writeln!(
            prompt,
            "It should be relatively budget-friendly, considering a weekly budget of ${}.",
            preferences.weekly_budget.normalize()
        );
    }

    if let Some(meal_type) = non_blank(&inputs.meal_type) {
        let _ = writeln!(prompt, "This recipe is for {meal_type}.");
    }
    if let Some(ingredients) = non_blank(&inputs.ingredients) {
        let _ = writeln!(prompt, "Try to incorporate these ingredients: {ingredients}.");
    }
    if let Some(cravings) = non_blank(&inputs.cravings) {
        let _ = writeln!(prompt, "The user is craving something {cravings}.");
    }

    prompt.push_str(
        "Please provide a creative and appealing recipe name. Keep instructions clear and concise.",
    );
    prompt
}

fn join_labels<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    labels.collect::<Vec<_>>().join(", ")
}

fn non_blank(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|v| !v.is_empty())
}
