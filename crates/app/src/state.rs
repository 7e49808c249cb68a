//! Application state shared by every front end.

use std::sync::Arc;

use tracing::{info, warn};

use crate::algolia::{AlgoliaClient, AlgoliaError};
use crate::config::{ALGOLIA_INCOMPLETE_WARNING, AppConfig, GEMINI_MISSING_WARNING};
use crate::gemini::{GeminiClient, GeminiError};
use crate::routes::{self, RouteDecision};
use crate::services::auth::AuthService;
use crate::services::board::RecipeBoard;
use crate::services::generation::{RecipeGeneration, RecipeGenerator};
use crate::services::preferences::PreferencesService;
use crate::services::search::{RecipeIndex, RecipeSearch};
use crate::services::shopping_list::ShoppingListService;
use crate::storage::{FileStore, KeyValueStore, StorageError};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("gemini client error: {0}")]
    Gemini(#[from] GeminiError),
    #[error("algolia client error: {0}")]
    Algolia(#[from] AlgoliaError),
}

/// Every service, wired to one store.
///
/// This struct is cheaply cloneable via `Arc`. The index and generator are
/// type parameters so tests can substitute fakes.
pub struct AppState<I = AlgoliaClient, G = GeminiClient> {
    inner: Arc<AppStateInner<I, G>>,
}

impl<I, G> Clone for AppState<I, G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<I, G> {
    store: Arc<dyn KeyValueStore>,
    auth: AuthService,
    preferences: PreferencesService,
    shopping_list: ShoppingListService,
    board: RecipeBoard,
    search: RecipeSearch<I>,
    generation: RecipeGeneration<G>,
}

impl AppState {
    /// Build the state from configuration, backed by a [`FileStore`].
    ///
    /// Degraded features are logged as warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or a client
    /// cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppStateError> {
        for warning in config.warnings() {
            warn!("{warning}");
        }

        let store = FileStore::open(&config.data_dir)?;
        info!(data_dir = %store.dir().display(), "using file store");

        let index = AlgoliaClient::new(&config.algolia)?;
        let generator = GeminiClient::new(&config.gemini)?;
        Ok(Self::with_parts(Arc::new(store), index, generator))
    }
}

impl<I: RecipeIndex, G: RecipeGenerator> AppState<I, G> {
    /// Wire the services to `store` with the given index and generator.
    ///
    /// Services start in their loading state; call [`AppState::load`].
    #[must_use]
    pub fn with_parts(store: Arc<dyn KeyValueStore>, index: I, generator: G) -> Self {
        let auth = AuthService::new(Arc::clone(&store));
        let preferences = PreferencesService::new(Arc::clone(&store));
        let shopping_list = ShoppingListService::new(Arc::clone(&store));
        let board = RecipeBoard::new();
        let search = RecipeSearch::new(index, board.clone());
        let generation = RecipeGeneration::new(generator, preferences.clone(), board.clone());

        Self {
            inner: Arc::new(AppStateInner {
                store,
                auth,
                preferences,
                shopping_list,
                board,
                search,
                generation,
            }),
        }
    }

    /// Restore every service from storage.
    ///
    /// All three services are loaded even if one fails; the first error is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns the first storage failure.
    pub fn load(&self) -> Result<(), StorageError> {
        let auth = self.inner.auth.load();
        let preferences = self.inner.preferences.load();
        let shopping_list = self.inner.shopping_list.load();
        auth.and(preferences).and(shopping_list)
    }

    /// Sign out, then reload preferences so they show the defaults again.
    ///
    /// # Errors
    ///
    /// Returns an error if a key cannot be removed or preferences cannot be
    /// reloaded.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.inner.auth.logout()?;
        self.inner.preferences.load()
    }

    /// Resolve a navigation request against the current state.
    #[must_use]
    pub fn route(&self, path: &str) -> RouteDecision {
        routes::resolve(
            path,
            &self.inner.auth.snapshot(),
            &self.inner.preferences.snapshot(),
        )
    }

    /// Banners for features running degraded.
    #[must_use]
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if !self.inner.generation.is_configured() {
            warnings.push(GEMINI_MISSING_WARNING);
        }
        if !self.inner.search.is_configured() {
            warnings.push(ALGOLIA_INCOMPLETE_WARNING);
        }
        warnings
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.inner.store
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn preferences(&self) -> &PreferencesService {
        &self.inner.preferences
    }

    #[must_use]
    pub fn shopping_list(&self) -> &ShoppingListService {
        &self.inner.shopping_list
    }

    #[must_use]
    pub fn board(&self) -> &RecipeBoard {
        &self.inner.board
    }

    #[must_use]
    pub fn search(&self) -> &RecipeSearch<I> {
        &self.inner.search
    }

    #[must_use]
    pub fn generation(&self) -> &RecipeGeneration<G> {
        &self.inner.generation
    }
}

#[cfg(test)]
mod tests {
    use cookmate_core::{PreferenceUpdate, Provider};

    use super::*;
    use crate::config::AppConfig;
    use crate::routes::Screen;
    use crate::storage::{MemoryStore, ONBOARDING_KEY, PREFERENCES_KEY};

    fn unconfigured() -> AppState {
        let config = AppConfig::from_lookup(|_| None).expect("config");
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        AppState::with_parts(
            store,
            AlgoliaClient::new(&config.algolia).expect("algolia"),
            GeminiClient::new(&config.gemini).expect("gemini"),
        )
    }

    #[test]
    fn test_state_is_clone_send_sync() {
        fn assert_traits<T: Clone + Send + Sync>() {}
        assert_traits::<AppState>();
    }

    #[test]
    fn test_warnings_follow_parts() {
        let state = unconfigured();
        assert_eq!(
            state.warnings(),
            [GEMINI_MISSING_WARNING, ALGOLIA_INCOMPLETE_WARNING]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_reloads_preferences() {
        let state = unconfigured();
        assert_eq!(state.route("/"), RouteDecision::Loading);
        state.load().expect("load");
        assert_eq!(state.route("/"), RouteDecision::Redirect(Screen::Login));

        state.auth().login(Provider::Google).await.expect("login");
        state
            .preferences()
            .update_preference(PreferenceUpdate::Servings(5))
            .expect("update");
        state.preferences().complete_onboarding().expect("complete");
        assert_eq!(state.route("/cookbook"), RouteDecision::Render(Screen::Cookbook));

        state.logout().expect("logout");
        let prefs = state.preferences().snapshot();
        assert_eq!(prefs.preferences.servings, 2);
        assert!(!prefs.onboarding_complete);
        assert!(state.store().get(PREFERENCES_KEY).expect("get").is_none());
        assert!(state.store().get(ONBOARDING_KEY).expect("get").is_none());
        assert_eq!(state.route("/cookbook"), RouteDecision::Redirect(Screen::Login));
    }

    #[test]
    fn test_from_config_uses_data_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let data_dir = dir.path().join("data");
        let data_dir_str = data_dir.display().to_string();
        let config = AppConfig::from_lookup(|key| {
            (key == "COOKMATE_DATA_DIR").then(|| data_dir_str.clone())
        })
        .expect("config");

        let state = AppState::from_config(&config).expect("state");
        state.load().expect("load");
        state
            .shopping_list()
            .add_manual("Rice", "1")
            .expect("add");
        assert!(data_dir.join("shoppingList.json").exists());
    }
}
