//! Integration tests for Cookmate.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cookmate-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_flow` - Sign-in, onboarding gate, sign-out and restart
//! - `shopping_flow` - Shopping list fed from recipes and manual entry
//! - `search_flow` - Debounced search, remote results and local fallback
//! - `generation_flow` - AI recipe generation against a scripted generator
//! - `http_clients` - The real Gemini and Algolia clients against mock servers
//!
//! Everything here runs offline. The helpers below wire an [`AppState`] to
//! a [`MemoryStore`] and scripted index/generator doubles.

use std::sync::{Arc, Mutex, PoisonError};

use cookmate_app::AppState;
use cookmate_app::algolia::AlgoliaError;
use cookmate_app::gemini::GeminiError;
use cookmate_app::services::{RecipeGenerator, RecipeIndex};
use cookmate_app::storage::{KeyValueStore, MemoryStore};
use cookmate_core::{Provider, Recipe};

/// App state wired to the scripted doubles.
pub type TestState = AppState<ScriptedIndex, ScriptedGenerator>;

/// A well-formed generated recipe, as the model is asked to return it.
pub const AI_REPLY: &str = r#"{
    "recipeName": "Chickpea Spinach Stew",
    "description": "A one-pot stew for busy evenings.",
    "servings": 2,
    "prepTime": "10 mins",
    "cookTime": "25 mins",
    "ingredients": [
        {"name": "Chickpeas", "quantity": 1, "unit": "can"},
        {"name": "Spinach", "quantity": "200", "unit": "g"},
        {"name": "Garlic", "quantity": "2", "unit": "cloves"}
    ],
    "instructions": ["Soften the garlic.", "Add chickpeas and simmer.", "Wilt in the spinach."],
    "notes": "Freezes well.",
    "dietTags": ["Vegan", "Gluten-Free", "Low-FODMAP"]
}"#;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Search index double
// =============================================================================

/// Search index returning a fixed answer and recording every query.
#[derive(Clone)]
pub struct ScriptedIndex {
    configured: bool,
    answer: Arc<Mutex<Result<Vec<Recipe>, String>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl ScriptedIndex {
    /// An index with no credentials; search stays local.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self::scripted(false, Ok(Vec::new()))
    }

    /// A configured index answering every query with `recipes`.
    #[must_use]
    pub fn answering(recipes: Vec<Recipe>) -> Self {
        Self::scripted(true, Ok(recipes))
    }

    /// A configured index whose every query fails.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self::scripted(true, Err(message.to_string()))
    }

    fn scripted(configured: bool, answer: Result<Vec<Recipe>, String>) -> Self {
        Self {
            configured,
            answer: Arc::new(Mutex::new(answer)),
            queries: Arc::default(),
        }
    }

    /// Queries received so far, in order.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

impl RecipeIndex for ScriptedIndex {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn search(&self, query: &str) -> Result<Vec<Recipe>, AlgoliaError> {
        lock(&self.queries).push(query.to_string());
        lock(&self.answer).clone().map_err(AlgoliaError::Parse)
    }
}

// =============================================================================
// Generator double
// =============================================================================

/// Generator returning a fixed reply and recording every prompt.
#[derive(Clone)]
pub struct ScriptedGenerator {
    configured: bool,
    reply: Arc<Mutex<Result<String, String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedGenerator {
    /// A generator without an API key.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self::scripted(false, Ok(String::new()))
    }

    #[must_use]
    pub fn replying(reply: &str) -> Self {
        Self::scripted(true, Ok(reply.to_string()))
    }

    /// A configured generator whose API call fails with `message`.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self::scripted(true, Err(message.to_string()))
    }

    fn scripted(configured: bool, reply: Result<String, String>) -> Self {
        Self {
            configured,
            reply: Arc::new(Mutex::new(reply)),
            prompts: Arc::default(),
        }
    }

    /// Prompts received so far, in order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

impl RecipeGenerator for ScriptedGenerator {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        lock(&self.prompts).push(prompt.to_string());
        lock(&self.reply).clone().map_err(|message| GeminiError::Api {
            status: "UNAVAILABLE".to_string(),
            message,
        })
    }
}

// =============================================================================
// State builders
// =============================================================================

/// Loaded state over a fresh memory store.
///
/// Returns the store as well so tests can inspect persisted keys.
#[must_use]
pub fn fresh_state(index: ScriptedIndex, generator: ScriptedGenerator) -> (TestState, Arc<MemoryStore>) {
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn KeyValueStore> = Arc::clone(&memory) as Arc<dyn KeyValueStore>;
    let state = AppState::with_parts(store, index, generator);
    // MemoryStore never fails to read
    let _ = state.load();
    (state, memory)
}

/// Sign in and finish onboarding with default preferences.
///
/// # Panics
///
/// Panics if sign-in or saving fails.
pub async fn sign_in_and_onboard(state: &TestState) {
    state.auth().login(Provider::Mock).await.expect("login");
    state
        .preferences()
        .complete_onboarding()
        .expect("complete onboarding");
}
