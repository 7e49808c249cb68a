//! AI recipe generation through `AppState`.

use std::collections::BTreeSet;

use cookmate_app::schema::AI_CATEGORY;
use cookmate_app::services::{GenerationError, GenerationInputs};
use cookmate_core::{DietRequirement, KitchenUtensil, PreferenceUpdate, catalog};
use cookmate_integration_tests::{
    AI_REPLY, ScriptedGenerator, ScriptedIndex, fresh_state, sign_in_and_onboard,
};

fn inputs() -> GenerationInputs {
    GenerationInputs {
        ingredients: "chickpeas, spinach".to_string(),
        meal_type: "dinner".to_string(),
        cravings: "something warm".to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_generated_recipe_leads_the_board() {
    let generator = ScriptedGenerator::replying(AI_REPLY);
    let (state, _store) = fresh_state(ScriptedIndex::unconfigured(), generator.clone());
    sign_in_and_onboard(&state).await;

    let generation = state.generation();
    generation.open_dialog();
    generation.set_inputs(inputs());
    let recipe = generation.generate().await.expect("generate");

    assert!(recipe.id.as_str().starts_with("ai-"));
    assert!(recipe.ai_generated);
    assert_eq!(recipe.category.as_deref(), Some(AI_CATEGORY));
    assert_eq!(recipe.name, "Chickpea Spinach Stew");
    assert!(recipe.image_url.starts_with("https://picsum.photos/seed/ai-"));
    assert_eq!(
        recipe.diet_tags,
        BTreeSet::from([DietRequirement::Vegan, DietRequirement::GlutenFree])
    );
    let chickpeas = recipe.ingredients.first().expect("ingredient");
    assert_eq!(chickpeas.quantity, "1");

    let board = state.board().snapshot();
    assert_eq!(board.len(), catalog::all().len() + 1);
    assert_eq!(board.first(), Some(&recipe));

    let dialog = generation.snapshot();
    assert!(!dialog.dialog_open);
    assert!(!dialog.loading);
    assert_eq!(dialog.error, None);
    assert!(dialog.inputs.is_empty());

    // The generated recipe feeds the shopping list like any other
    state.shopping_list().add_recipe(&recipe).expect("add");
    assert_eq!(state.shopping_list().items().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_prompt_reflects_saved_preferences() {
    let generator = ScriptedGenerator::replying(AI_REPLY);
    let (state, _store) = fresh_state(ScriptedIndex::unconfigured(), generator.clone());
    sign_in_and_onboard(&state).await;

    state
        .preferences()
        .update_preference(PreferenceUpdate::DietaryRequirements(BTreeSet::from([
            DietRequirement::Vegan,
        ])))
        .expect("diets");
    state
        .preferences()
        .update_preference(PreferenceUpdate::KitchenUtensils(BTreeSet::from([
            KitchenUtensil::AirFryer,
        ])))
        .expect("utensils");

    state.generation().set_inputs(inputs());
    state.generation().generate().await.expect("generate");

    let prompts = generator.prompts();
    let prompt = prompts.first().expect("one prompt");
    assert!(prompt.contains("It must be suitable for these diets: Vegan."));
    assert!(prompt.contains("The kitchen is equipped with at least the following: Air Fryer."));
    assert!(prompt.contains("It should be for 2 servings."));
    assert!(prompt.contains("weekly budget of $50."));
    assert!(prompt.contains("This recipe is for dinner."));
    assert!(prompt.contains("Try to incorporate these ingredients: chickpeas, spinach."));
}

#[tokio::test]
async fn test_fenced_reply_is_accepted() {
    let fenced = format!("```json\n{AI_REPLY}\n```");
    let (state, _store) = fresh_state(
        ScriptedIndex::unconfigured(),
        ScriptedGenerator::replying(&fenced),
    );

    let recipe = state.generation().generate().await.expect("generate");
    assert_eq!(recipe.name, "Chickpea Spinach Stew");
}

#[tokio::test]
async fn test_missing_key_sends_nothing() {
    let generator = ScriptedGenerator::unconfigured();
    let (state, _store) = fresh_state(ScriptedIndex::unconfigured(), generator.clone());
    state.generation().open_dialog();

    let err = state.generation().generate().await.expect_err("no key");
    assert!(matches!(err, GenerationError::MissingCredential));
    assert!(generator.prompts().is_empty());

    let dialog = state.generation().snapshot();
    assert!(dialog.dialog_open);
    assert!(!dialog.loading);
    assert_eq!(
        dialog.error.as_deref(),
        Some("Gemini API Key is not configured. Cannot generate AI recipe.")
    );
    assert_eq!(state.board().snapshot(), catalog::all());
}

#[tokio::test]
async fn test_malformed_reply_keeps_dialog_open() {
    let (state, _store) = fresh_state(
        ScriptedIndex::unconfigured(),
        ScriptedGenerator::replying(r#"{"recipeName": "Half a recipe"}"#),
    );
    state.generation().open_dialog();
    state.generation().set_inputs(inputs());

    let err = state.generation().generate().await.expect_err("malformed");
    assert!(matches!(err, GenerationError::MalformedResponse(_)));

    let dialog = state.generation().snapshot();
    assert!(dialog.dialog_open);
    assert_eq!(dialog.inputs, inputs());
    assert!(
        dialog
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("Failed to generate recipe. invalid recipe JSON"))
    );
    assert_eq!(state.board().snapshot(), catalog::all());
}

#[tokio::test]
async fn test_remote_failure_is_reported() {
    let (state, _store) = fresh_state(
        ScriptedIndex::unconfigured(),
        ScriptedGenerator::failing("model overloaded"),
    );

    let err = state.generation().generate().await.expect_err("remote");
    assert_eq!(
        err.user_message(),
        "Failed to generate recipe. API error (UNAVAILABLE): model overloaded"
    );
}
