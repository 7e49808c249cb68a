//! Culinary preferences collected during onboarding.
//!
//! Two invariants hold for every [`UserPreferences`] that leaves this
//! module through [`UserPreferences::normalized`] or
//! [`UserPreferences::from_stored`]:
//!
//! - `dietary_requirements` is never empty (falls back to `{None}`)
//! - `kitchen_utensils` is never empty (falls back to `{Basic set}`)
//!
//! Emptying a set is not an error; it is silently repaired.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error returned when a preference label or slug is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct PreferenceParseError {
    kind: &'static str,
    value: String,
}

/// Defines a preference enum whose wire names are human-readable labels.
///
/// Each variant gets a label (the JSON representation, kept identical to
/// what earlier clients stored) and a short slug accepted by `FromStr`.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $err:literal {
            $($variant:ident => ($label:literal, $slug:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Label used in storage, prompts and UI.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            /// Short command-line friendly name.
            #[must_use]
            pub const fn slug(self) -> &'static str {
                match self {
                    $(Self::$variant => $slug,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = PreferenceParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| {
                        v.label().eq_ignore_ascii_case(wanted)
                            || v.slug().eq_ignore_ascii_case(wanted)
                    })
                    .ok_or_else(|| PreferenceParseError {
                        kind: $err,
                        value: wanted.to_owned(),
                    })
            }
        }
    };
}

labelled_enum! {
    /// A dietary restriction the user follows.
    DietRequirement, "diet" {
        Keto => ("Keto", "keto"),
        Vegetarian => ("Vegetarian", "vegetarian"),
        Vegan => ("Vegan", "vegan"),
        GlutenFree => ("Gluten-Free", "gluten-free"),
        Pescatarian => ("Pescatarian", "pescatarian"),
        Paleo => ("Paleo", "paleo"),
        None => ("None", "none"),
    }
}

labelled_enum! {
    /// Equipment available in the user's kitchen.
    KitchenUtensil, "kitchen utensil" {
        BasicSet => ("Basic (Pots, Pans, Knives)", "basic"),
        Microwave => ("Microwave", "microwave"),
        Oven => ("Oven", "oven"),
        Blender => ("Blender", "blender"),
        FoodProcessor => ("Food Processor", "food-processor"),
        StandMixer => ("Stand Mixer", "stand-mixer"),
        SlowCooker => ("Slow Cooker (Crockpot)", "slow-cooker"),
        PressureCooker => ("Pressure Cooker (Instant Pot)", "pressure-cooker"),
        AirFryer => ("Air Fryer", "air-fryer"),
        Grill => ("Grill / BBQ", "grill"),
        Toaster => ("Toaster", "toaster"),
        WaffleIron => ("Waffle Iron", "waffle-iron"),
    }
}

labelled_enum! {
    /// How confident the cook is.
    ChefSkillLevel, "skill level" {
        Beginner => ("Beginner", "beginner"),
        Intermediate => ("Intermediate", "intermediate"),
        Advanced => ("Advanced", "advanced"),
    }
}

/// Default number of servings for a new profile.
pub const DEFAULT_SERVINGS: u32 = 2;

/// Default weekly budget (in dollars) for a new profile.
pub const DEFAULT_WEEKLY_BUDGET: i64 = 50;

/// The user's culinary profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub dietary_requirements: BTreeSet<DietRequirement>,
    pub kitchen_utensils: BTreeSet<KitchenUtensil>,
    pub chef_skill_level: ChefSkillLevel,
    pub servings: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub weekly_budget: Decimal,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            dietary_requirements: BTreeSet::from([DietRequirement::None]),
            kitchen_utensils: BTreeSet::from([KitchenUtensil::BasicSet]),
            chef_skill_level: ChefSkillLevel::Beginner,
            servings: DEFAULT_SERVINGS,
            weekly_budget: Decimal::from(DEFAULT_WEEKLY_BUDGET),
        }
    }
}

/// A single-field change to [`UserPreferences`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceUpdate {
    DietaryRequirements(BTreeSet<DietRequirement>),
    KitchenUtensils(BTreeSet<KitchenUtensil>),
    ChefSkillLevel(ChefSkillLevel),
    Servings(u32),
    WeeklyBudget(Decimal),
}

impl UserPreferences {
    /// Repair values that would violate the profile invariants.
    ///
    /// Empty sets fall back to their default singleton, servings are at
    /// least one and the budget is never negative.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.dietary_requirements.is_empty() {
            self.dietary_requirements.insert(DietRequirement::None);
        }
        if self.kitchen_utensils.is_empty() {
            self.kitchen_utensils.insert(KitchenUtensil::BasicSet);
        }
        if self.servings == 0 {
            self.servings = 1;
        }
        if self.weekly_budget.is_sign_negative() {
            self.weekly_budget = Decimal::ZERO;
        }
        self
    }

    /// Apply a single-field update and re-establish the invariants.
    #[must_use]
    pub fn with_update(mut self, update: PreferenceUpdate) -> Self {
        match update {
            PreferenceUpdate::DietaryRequirements(diets) => self.dietary_requirements = diets,
            PreferenceUpdate::KitchenUtensils(utensils) => self.kitchen_utensils = utensils,
            PreferenceUpdate::ChefSkillLevel(level) => self.chef_skill_level = level,
            PreferenceUpdate::Servings(servings) => self.servings = servings,
            PreferenceUpdate::WeeklyBudget(budget) => self.weekly_budget = budget,
        }
        self.normalized()
    }

    /// Diet set with `diet` flipped, as the settings checkboxes produce it.
    #[must_use]
    pub fn toggled_diet(&self, diet: DietRequirement) -> BTreeSet<DietRequirement> {
        toggled(&self.dietary_requirements, diet)
    }

    /// Utensil set with `utensil` flipped.
    #[must_use]
    pub fn toggled_utensil(&self, utensil: KitchenUtensil) -> BTreeSet<KitchenUtensil> {
        toggled(&self.kitchen_utensils, utensil)
    }

    /// Diets that actually restrict the recipe (everything but `None`).
    ///
    /// Returns an empty list when `None` is selected at all.
    #[must_use]
    pub fn restricting_diets(&self) -> Vec<DietRequirement> {
        if self.dietary_requirements.contains(&DietRequirement::None) {
            return Vec::new();
        }
        self.dietary_requirements.iter().copied().collect()
    }

    /// Decode a stored record, migrating shapes written by older clients.
    ///
    /// - A bare string where a list is expected becomes a singleton list
    /// - `null` or a missing list becomes the default singleton
    /// - Missing scalar fields take their default values
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an object or a field holds an
    /// unknown label or a value of the wrong type.
    pub fn from_stored(value: Value) -> Result<Self, serde_json::Error> {
        let Value::Object(mut stored) = value else {
            return Err(serde::de::Error::custom("stored preferences must be an object"));
        };

        let Value::Object(defaults) = serde_json::to_value(Self::default())? else {
            return Err(serde::de::Error::custom("default preferences must be an object"));
        };

        for (key, default) in defaults {
            let entry = stored.entry(key.clone()).or_insert(Value::Null);
            let is_list = matches!(key.as_str(), "dietaryRequirements" | "kitchenUtensils");
            *entry = match entry.take() {
                Value::Null => default,
                Value::String(s) if is_list => Value::Array(vec![Value::String(s)]),
                other => other,
            };
        }

        serde_json::from_value::<Self>(Value::Object(stored)).map(Self::normalized)
    }
}

fn toggled<T: Ord + Copy>(set: &BTreeSet<T>, item: T) -> BTreeSet<T> {
    let mut next = set.clone();
    if !next.remove(&item) {
        next.insert(item);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let prefs = UserPreferences::default();
        assert_eq!(
            prefs.dietary_requirements,
            BTreeSet::from([DietRequirement::None])
        );
        assert_eq!(
            prefs.kitchen_utensils,
            BTreeSet::from([KitchenUtensil::BasicSet])
        );
        assert_eq!(prefs.chef_skill_level, ChefSkillLevel::Beginner);
        assert_eq!(prefs.servings, 2);
        assert_eq!(prefs.weekly_budget, Decimal::from(50));
    }

    #[test]
    fn test_wire_format_matches_stored_records() {
        let value = serde_json::to_value(UserPreferences::default()).expect("serialize");
        assert_eq!(
            value,
            json!({
                "dietaryRequirements": ["None"],
                "kitchenUtensils": ["Basic (Pots, Pans, Knives)"],
                "chefSkillLevel": "Beginner",
                "servings": 2,
                "weeklyBudget": 50.0
            })
        );
    }

    #[test]
    fn test_emptying_sets_is_repaired() {
        let prefs = UserPreferences::default()
            .with_update(PreferenceUpdate::KitchenUtensils(BTreeSet::new()))
            .with_update(PreferenceUpdate::DietaryRequirements(BTreeSet::new()));
        assert_eq!(
            prefs.kitchen_utensils,
            BTreeSet::from([KitchenUtensil::BasicSet])
        );
        assert_eq!(
            prefs.dietary_requirements,
            BTreeSet::from([DietRequirement::None])
        );
    }

    #[test]
    fn test_scalar_coercion() {
        let prefs = UserPreferences::default()
            .with_update(PreferenceUpdate::Servings(0))
            .with_update(PreferenceUpdate::WeeklyBudget(Decimal::from(-5)));
        assert_eq!(prefs.servings, 1);
        assert_eq!(prefs.weekly_budget, Decimal::ZERO);
    }

    #[test]
    fn test_toggle_last_utensil_falls_back_to_basic() {
        let prefs = UserPreferences::default();
        let toggled = prefs.toggled_utensil(KitchenUtensil::BasicSet);
        assert!(toggled.is_empty());

        let prefs = prefs.with_update(PreferenceUpdate::KitchenUtensils(toggled));
        assert_eq!(
            prefs.kitchen_utensils,
            BTreeSet::from([KitchenUtensil::BasicSet])
        );
    }

    #[test]
    fn test_toggle_diet_adds_and_removes() {
        let prefs = UserPreferences::default();
        let diets = prefs.toggled_diet(DietRequirement::Vegan);
        assert!(diets.contains(&DietRequirement::Vegan));
        assert!(diets.contains(&DietRequirement::None));

        let prefs = prefs.with_update(PreferenceUpdate::DietaryRequirements(diets));
        let diets = prefs.toggled_diet(DietRequirement::Vegan);
        assert!(!diets.contains(&DietRequirement::Vegan));
    }

    #[test]
    fn test_restricting_diets_ignores_none() {
        let mut prefs = UserPreferences::default();
        assert!(prefs.restricting_diets().is_empty());

        prefs.dietary_requirements = BTreeSet::from([DietRequirement::Keto, DietRequirement::Paleo]);
        assert_eq!(
            prefs.restricting_diets(),
            vec![DietRequirement::Keto, DietRequirement::Paleo]
        );
    }

    #[test]
    fn test_from_stored_wraps_legacy_string() {
        let stored = json!({
            "dietaryRequirements": ["Vegan"],
            "kitchenUtensils": "Oven",
            "chefSkillLevel": "Advanced",
            "servings": 4,
            "weeklyBudget": 120
        });
        let prefs = UserPreferences::from_stored(stored).expect("migrate");
        assert_eq!(prefs.kitchen_utensils, BTreeSet::from([KitchenUtensil::Oven]));
        assert_eq!(prefs.chef_skill_level, ChefSkillLevel::Advanced);
        assert_eq!(prefs.servings, 4);
        assert_eq!(prefs.weekly_budget, Decimal::from(120));
    }

    #[test]
    fn test_from_stored_repairs_empty_and_missing() {
        let stored = json!({
            "dietaryRequirements": [],
            "kitchenUtensils": null,
            "servings": 3
        });
        let prefs = UserPreferences::from_stored(stored).expect("migrate");
        assert_eq!(
            prefs.dietary_requirements,
            BTreeSet::from([DietRequirement::None])
        );
        assert_eq!(
            prefs.kitchen_utensils,
            BTreeSet::from([KitchenUtensil::BasicSet])
        );
        assert_eq!(prefs.servings, 3);
        assert_eq!(prefs.chef_skill_level, ChefSkillLevel::Beginner);
    }

    #[test]
    fn test_from_stored_rejects_garbage() {
        assert!(UserPreferences::from_stored(json!("nope")).is_err());
        assert!(UserPreferences::from_stored(json!({"chefSkillLevel": "Wizard"})).is_err());
    }

    #[test]
    fn test_enum_parse_accepts_label_and_slug() {
        assert_eq!(
            "gluten-free".parse::<DietRequirement>(),
            Ok(DietRequirement::GlutenFree)
        );
        assert_eq!(
            "Gluten-Free".parse::<DietRequirement>(),
            Ok(DietRequirement::GlutenFree)
        );
        assert_eq!(
            "air-fryer".parse::<KitchenUtensil>(),
            Ok(KitchenUtensil::AirFryer)
        );
        assert_eq!(
            "Grill / BBQ".parse::<KitchenUtensil>(),
            Ok(KitchenUtensil::Grill)
        );
        assert_eq!(
            "ADVANCED".parse::<ChefSkillLevel>(),
            Ok(ChefSkillLevel::Advanced)
        );
        assert!("raw".parse::<DietRequirement>().is_err());
    }

    #[test]
    fn test_enum_parse_error_names_kind_and_value() {
        let err = " raw ".parse::<DietRequirement>().expect_err("unknown diet");
        assert_eq!(err.to_string(), "unknown diet 'raw'");

        let err = "spork".parse::<KitchenUtensil>().expect_err("unknown utensil");
        assert_eq!(err.to_string(), "unknown kitchen utensil 'spork'");
    }
}
