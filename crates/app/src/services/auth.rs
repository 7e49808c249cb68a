//! Session service backed by mocked identity providers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, instrument, warn};

use cookmate_core::{Provider, User};

use crate::storage::{
    self, AUTH_USER_KEY, KeyValueStore, ONBOARDING_KEY, PREFERENCES_KEY, StorageError,
};

/// Simulated provider round trip.
pub const LOGIN_LATENCY: Duration = Duration::from_secs(1);

/// Read model published by [`AuthService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    /// Set while a session is being restored or a login is in flight.
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

impl AuthState {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Owns the signed-in user.
#[derive(Clone)]
pub struct AuthService {
    inner: Arc<AuthInner>,
}

struct AuthInner {
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<AuthState>,
}

impl AuthService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            inner: Arc::new(AuthInner { store, state }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner.state.borrow().user.clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    /// Restore a previous session, if one was persisted.
    ///
    /// A stored session that no longer decodes is treated as signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be read. The loading
    /// flag is cleared either way.
    pub fn load(&self) -> Result<(), StorageError> {
        let restored = match storage::read_json::<User>(self.inner.store.as_ref(), AUTH_USER_KEY)
        {
            Ok(user) => Ok(user),
            Err(StorageError::Json { source, .. }) => {
                warn!(error = %source, "stored session is unreadable, signing out");
                Ok(None)
            }
            Err(e) => Err(e),
        };

        let user = restored.as_ref().ok().cloned().flatten();
        if let Some(user) = &user {
            info!(user_id = %user.id, provider = %user.provider, "session restored");
        }
        self.inner.state.send_replace(AuthState {
            user,
            loading: false,
        });
        restored.map(|_| ())
    }

    /// Sign in with `provider`.
    ///
    /// Always succeeds after [`LOGIN_LATENCY`]; the returned user is
    /// deterministic per provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be persisted. The loading flag
    /// is cleared either way.
    #[instrument(skip(self))]
    pub async fn login(&self, provider: Provider) -> Result<User, StorageError> {
        self.inner.state.send_modify(|state| state.loading = true);
        tokio::time::sleep(LOGIN_LATENCY).await;

        let user = User::mock(provider);
        let mut outcome = Ok(());
        self.inner.state.send_modify(|state| {
            outcome = storage::write_json(self.inner.store.as_ref(), AUTH_USER_KEY, &user);
            if outcome.is_ok() {
                state.user = Some(user.clone());
            }
            state.loading = false;
        });
        outcome?;

        info!(user_id = %user.id, "signed in");
        Ok(user)
    }

    /// Sign out and erase the session together with the preference keys.
    ///
    /// The preference service keeps its in-memory state; callers reload it
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns the first storage failure. Keys are removed one by one, so a
    /// failure can leave later keys in place.
    pub fn logout(&self) -> Result<(), StorageError> {
        let store = self.inner.store.as_ref();
        self.inner.state.send_modify(|state| state.user = None);

        for key in [AUTH_USER_KEY, PREFERENCES_KEY, ONBOARDING_KEY] {
            store.remove(key)?;
        }
        info!("signed out");
        Ok(())
    }
}
