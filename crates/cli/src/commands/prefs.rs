//! Onboarding and settings.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use rust_decimal::Decimal;

use cookmate_app::AppState;
use cookmate_app::routes::Screen;
use cookmate_core::{
    ChefSkillLevel, DietRequirement, KitchenUtensil, PreferenceUpdate, UserPreferences,
};

use super::{CliError, ensure_screen};

/// Answers collected by the onboarding wizard. Unset fields keep their
/// current value.
#[derive(Debug, Default)]
pub struct OnboardingAnswers {
    pub diets: Vec<DietRequirement>,
    pub utensils: Vec<KitchenUtensil>,
    pub skill: Option<ChefSkillLevel>,
    pub servings: Option<u32>,
    pub budget: Option<Decimal>,
}

/// Run the three onboarding steps in one go and mark onboarding complete.
pub fn onboard(state: &AppState, answers: OnboardingAnswers) -> Result<String, CliError> {
    ensure_screen(state, Screen::OnboardingDiet)?;

    let service = state.preferences();
    let mut preferences = service.preferences();
    if !answers.diets.is_empty() {
        preferences = preferences.with_update(PreferenceUpdate::DietaryRequirements(
            answers.diets.into_iter().collect(),
        ));
    }
    if !answers.utensils.is_empty() {
        preferences = preferences.with_update(PreferenceUpdate::KitchenUtensils(
            answers.utensils.into_iter().collect(),
        ));
    }
    if let Some(skill) = answers.skill {
        preferences = preferences.with_update(PreferenceUpdate::ChefSkillLevel(skill));
    }
    if let Some(servings) = answers.servings {
        preferences = preferences.with_update(PreferenceUpdate::Servings(servings));
    }
    if let Some(budget) = answers.budget {
        preferences = preferences.with_update(PreferenceUpdate::WeeklyBudget(budget));
    }

    service.save_preferences(preferences)?;
    service.complete_onboarding()?;
    tracing::info!("Onboarding complete");

    Ok(format!(
        "Onboarding complete.\n\n{}",
        describe(&service.preferences())
    ))
}

/// Print the current profile.
pub fn show(state: &AppState) -> Result<String, CliError> {
    ensure_screen(state, Screen::Settings)?;
    Ok(describe(&state.preferences().preferences()))
}

/// Replace one field of the profile.
pub fn set(state: &AppState, update: PreferenceUpdate) -> Result<String, CliError> {
    ensure_screen(state, Screen::Settings)?;
    state.preferences().update_preference(update)?;
    Ok(describe(&state.preferences().preferences()))
}

/// Flip one diet on or off, as the settings checkbox does.
pub fn toggle_diet(state: &AppState, diet: DietRequirement) -> Result<String, CliError> {
    ensure_screen(state, Screen::Settings)?;
    state.preferences().toggle_diet(diet)?;
    Ok(describe(&state.preferences().preferences()))
}

/// Flip one utensil on or off.
pub fn toggle_utensil(state: &AppState, utensil: KitchenUtensil) -> Result<String, CliError> {
    ensure_screen(state, Screen::Settings)?;
    state.preferences().toggle_utensil(utensil)?;
    Ok(describe(&state.preferences().preferences()))
}

/// Send the user back through onboarding on the next visit.
pub fn reset_onboarding(state: &AppState) -> Result<String, CliError> {
    ensure_screen(state, Screen::Settings)?;
    state.preferences().reset_onboarding()?;
    Ok(
        "Onboarding reset and preferences restored to defaults. Run `cookmate onboard` to set them up again."
            .to_string(),
    )
}

/// Accepted values for the labelled preference enums, for help output.
#[must_use]
pub fn choices() -> String {
    fn slugs<T: Copy>(all: &[T], slug: fn(T) -> &'static str) -> String {
        all.iter().map(|v| slug(*v)).collect::<Vec<_>>().join(", ")
    }
    format!(
        "Diets: {}\nUtensils: {}\nSkill levels: {}",
        slugs(DietRequirement::ALL, DietRequirement::slug),
        slugs(KitchenUtensil::ALL, KitchenUtensil::slug),
        slugs(ChefSkillLevel::ALL, ChefSkillLevel::slug),
    )
}

fn describe(preferences: &UserPreferences) -> String {
    fn labels<T: Copy>(set: &BTreeSet<T>, label: fn(T) -> &'static str) -> String {
        set.iter().map(|v| label(*v)).collect::<Vec<_>>().join(", ")
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Diets:        {}",
        labels(&preferences.dietary_requirements, DietRequirement::label)
    );
    let _ = writeln!(
        out,
        "Utensils:     {}",
        labels(&preferences.kitchen_utensils, KitchenUtensil::label)
    );
    let _ = writeln!(out, "Skill level:  {}", preferences.chef_skill_level);
    let _ = writeln!(out, "Servings:     {}", preferences.servings);
    let _ = write!(out, "Budget:       ${}/week", preferences.weekly_budget.normalize());
    out
}
