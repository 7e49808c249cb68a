//! Stateful services and user flows.
//!
//! Each service publishes its read model through a `tokio::sync::watch`
//! channel: call `subscribe()` and re-read on change, or `snapshot()` for a
//! one-off copy.

pub mod auth;
pub mod board;
pub mod generation;
pub mod preferences;
pub mod prompt;
pub mod search;
pub mod shopping_list;

pub use auth::{AuthService, AuthState, LOGIN_LATENCY};
pub use board::RecipeBoard;
pub use generation::{GenerationError, GenerationState, RecipeGeneration, RecipeGenerator};
pub use preferences::{PreferencesService, PreferencesState};
pub use prompt::{GenerationInputs, build_recipe_prompt};
pub use search::{RecipeIndex, RecipeSearch, SEARCH_DEBOUNCE, SearchNotice, SearchState};
pub use shopping_list::{ShoppingListService, ShoppingListState};
