//! Core types for Cookmate.
//!
//! This module provides type-safe wrappers for the domain concepts shared
//! by every service: users, culinary preferences, recipes and shopping
//! list items.

pub mod id;
pub mod preferences;
pub mod recipe;
pub mod shopping;
pub mod user;

pub use id::*;
pub use preferences::{
    ChefSkillLevel, DietRequirement, KitchenUtensil, PreferenceParseError, PreferenceUpdate,
    UserPreferences,
};
pub use recipe::{Ingredient, Recipe};
pub use shopping::{NewShoppingItem, ShoppingListItem};
pub use user::{Provider, ProviderParseError, User};
