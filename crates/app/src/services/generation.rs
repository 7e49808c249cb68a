//! AI recipe generation flow.
//!
//! Builds a prompt from the saved preferences and the dialog inputs, asks
//! the generator for a recipe, validates the reply and prepends the result
//! to the recipe board.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use cookmate_core::{Recipe, RecipeId};

use crate::gemini::GeminiError;
use crate::schema::{self, RecipeSchemaError};
use crate::services::board::RecipeBoard;
use crate::services::preferences::PreferencesService;
use crate::services::prompt::{GenerationInputs, build_recipe_prompt};

/// A text generator able to answer recipe prompts.
pub trait RecipeGenerator: Send + Sync + 'static {
    /// Whether a credential is available.
    fn is_configured(&self) -> bool;

    /// Return the raw text produced for `prompt`.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, GeminiError>> + Send;
}

/// Why a generation attempt failed.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No API key; nothing was sent.
    #[error("Gemini API Key is not configured. Cannot generate AI recipe.")]
    MissingCredential,

    /// The API call failed.
    #[error(transparent)]
    Remote(#[from] GeminiError),

    /// The reply was not a valid recipe.
    #[error(transparent)]
    MalformedResponse(#[from] RecipeSchemaError),
}

impl GenerationError {
    /// Text shown in the generation dialog.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredential => self.to_string(),
            Self::Remote(_) | Self::MalformedResponse(_) => {
                format!("Failed to generate recipe. {self}")
            }
        }
    }
}

/// Read model published by [`RecipeGeneration`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationState {
    pub dialog_open: bool,
    pub loading: bool,
    /// User-visible message of the last failure.
    pub error: Option<String>,
    pub inputs: GenerationInputs,
}

/// The generation flow. Cheaply cloneable; clones share state.
pub struct RecipeGeneration<G> {
    inner: Arc<GenerationInner<G>>,
}

impl<G> Clone for RecipeGeneration<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct GenerationInner<G> {
    generator: G,
    preferences: PreferencesService,
    board: RecipeBoard,
    state: watch::Sender<GenerationState>,
}

impl<G: RecipeGenerator> RecipeGeneration<G> {
    #[must_use]
    pub fn new(generator: G, preferences: PreferencesService, board: RecipeBoard) -> Self {
        let (state, _) = watch::channel(GenerationState::default());
        Self {
            inner: Arc::new(GenerationInner {
                generator,
                preferences,
                board,
                state,
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> GenerationState {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.generator.is_configured()
    }

    pub fn open_dialog(&self) {
        self.inner.state.send_modify(|state| {
            state.dialog_open = true;
            state.error = None;
        });
    }

    /// Close the dialog, keeping whatever was typed.
    pub fn close_dialog(&self) {
        self.inner.state.send_modify(|state| state.dialog_open = false);
    }

    /// Replace the three dialog inputs.
    pub fn set_inputs(&self, inputs: GenerationInputs) {
        self.inner.state.send_modify(|state| state.inputs = inputs);
    }

    /// Generate a recipe from the current preferences and dialog inputs.
    ///
    /// On success the recipe is prepended to the board, the dialog closes
    /// and the inputs are cleared. On failure the board is untouched and the
    /// message is kept in [`GenerationState::error`].
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::MissingCredential`] without any network
    /// call when no key is configured, [`GenerationError::Remote`] when the
    /// API call fails, and [`GenerationError::MalformedResponse`] when the
    /// reply is not a valid recipe.
    #[instrument(skip(self))]
    pub async fn generate(&self) -> Result<Recipe, GenerationError> {
        if !self.inner.generator.is_configured() {
            let err = GenerationError::MissingCredential;
            warn!("recipe generation requested without an API key");
            self.inner.state.send_modify(|state| {
                state.loading = false;
                state.error = Some(err.user_message());
            });
            return Err(err);
        }

        let mut inputs = GenerationInputs::default();
        self.inner.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
            inputs = state.inputs.clone();
        });

        let prompt = build_recipe_prompt(&self.inner.preferences.preferences(), &inputs);
        match self.request_recipe(&prompt).await {
            Ok(recipe) => {
                info!(recipe_id = %recipe.id, name = %recipe.name, "AI recipe generated");
                self.inner.board.prepend(recipe.clone());
                self.inner.state.send_modify(|state| {
                    state.loading = false;
                    state.dialog_open = false;
                    state.inputs = GenerationInputs::default();
                });
                Ok(recipe)
            }
            Err(err) => {
                warn!(error = %err, "AI recipe generation failed");
                self.inner.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(err.user_message());
                });
                Err(err)
            }
        }
    }

    async fn request_recipe(&self, prompt: &str) -> Result<Recipe, GenerationError> {
        let raw = self.inner.generator.generate(prompt).await?;
        let parsed = schema::parse_ai_recipe(&raw)?;
        Ok(parsed.into_recipe(ai_recipe_id(), placeholder_image_url()))
    }
}

fn ai_recipe_id() -> RecipeId {
    RecipeId::new(format!("ai-{}", Utc::now().timestamp_millis()))
}

fn placeholder_image_url() -> String {
    let seed: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    format!("https://picsum.photos/seed/ai-{seed}/400/300")
}
