//! Preference service: the culinary profile and onboarding flag.
//!
//! Every mutator writes through to storage before the new state becomes
//! visible to subscribers. Mutations are read-modify-writes performed under
//! the state lock, so two quick updates never race on a stale snapshot.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use cookmate_core::{DietRequirement, KitchenUtensil, PreferenceUpdate, UserPreferences};

use crate::storage::{self, KeyValueStore, ONBOARDING_KEY, PREFERENCES_KEY, StorageError};

/// Read model published by [`PreferencesService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferencesState {
    pub preferences: UserPreferences,
    pub onboarding_complete: bool,
    /// `true` until [`PreferencesService::load`] has run.
    pub loading: bool,
}

impl Default for PreferencesState {
    fn default() -> Self {
        Self {
            preferences: UserPreferences::default(),
            onboarding_complete: false,
            loading: true,
        }
    }
}

/// Owns the user's preferences and onboarding flag.
///
/// Cheaply cloneable; clones share state.
#[derive(Clone)]
pub struct PreferencesService {
    inner: Arc<PreferencesInner>,
}

struct PreferencesInner {
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<PreferencesState>,
}

impl PreferencesService {
    /// Create the service in its loading state.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(PreferencesState::default());
        Self {
            inner: Arc::new(PreferencesInner { store, state }),
        }
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> PreferencesState {
        self.inner.state.borrow().clone()
    }

    /// Current preferences.
    #[must_use]
    pub fn preferences(&self) -> UserPreferences {
        self.inner.state.borrow().preferences.clone()
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PreferencesState> {
        self.inner.state.subscribe()
    }

    /// Restore state from storage, migrating older record shapes.
    ///
    /// Unreadable records fall back to defaults with a warning. The loading
    /// flag is cleared even when storage fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be read.
    pub fn load(&self) -> Result<(), StorageError> {
        let store = self.inner.store.as_ref();
        let result = read_preferences(store).and_then(|preferences| {
            let onboarding_complete = read_onboarding_flag(store)?;
            Ok((preferences, onboarding_complete))
        });

        let (preferences, onboarding_complete, outcome) = match result {
            Ok((preferences, complete)) => (preferences, complete, Ok(())),
            Err(e) => (UserPreferences::default(), false, Err(e)),
        };

        debug!(onboarding_complete, "preferences loaded");
        self.inner.state.send_replace(PreferencesState {
            preferences,
            onboarding_complete,
            loading: false,
        });
        outcome
    }

    /// Replace the whole profile.
    ///
    /// Empty sets are coerced to their defaults before saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted; state is then
    /// left unchanged.
    pub fn save_preferences(&self, preferences: UserPreferences) -> Result<(), StorageError> {
        self.modify(|state, store| {
            let preferences = preferences.normalized();
            storage::write_json(store, PREFERENCES_KEY, &preferences)?;
            state.preferences = preferences;
            Ok(())
        })
    }

    /// Change a single field, merged into the latest committed profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted; state is then
    /// left unchanged.
    pub fn update_preference(&self, update: PreferenceUpdate) -> Result<(), StorageError> {
        self.apply(|_| update)
    }

    /// Flip one diet on or off in the latest committed profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    pub fn toggle_diet(&self, diet: DietRequirement) -> Result<(), StorageError> {
        self.apply(|current| PreferenceUpdate::DietaryRequirements(current.toggled_diet(diet)))
    }

    /// Flip one utensil on or off in the latest committed profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be persisted.
    pub fn toggle_utensil(&self, utensil: KitchenUtensil) -> Result<(), StorageError> {
        self.apply(|current| {
            PreferenceUpdate::KitchenUtensils(current.toggled_utensil(utensil))
        })
    }

    /// Mark onboarding as finished.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be persisted.
    pub fn complete_onboarding(&self) -> Result<(), StorageError> {
        self.modify(|state, store| {
            storage::write_json(store, ONBOARDING_KEY, &true)?;
            state.onboarding_complete = true;
            Ok(())
        })?;
        info!("onboarding completed");
        Ok(())
    }

    /// Restart onboarding: default profile, flag cleared, both keys erased.
    ///
    /// # Errors
    ///
    /// Returns an error if a key cannot be removed.
    pub fn reset_onboarding(&self) -> Result<(), StorageError> {
        self.modify(|state, store| {
            store.remove(PREFERENCES_KEY)?;
            store.remove(ONBOARDING_KEY)?;
            state.preferences = UserPreferences::default();
            state.onboarding_complete = false;
            Ok(())
        })?;
        info!("onboarding reset");
        Ok(())
    }

    /// Build an update from the committed profile and persist the result,
    /// all under the state lock.
    fn apply<F>(&self, update: F) -> Result<(), StorageError>
    where
        F: FnOnce(&UserPreferences) -> PreferenceUpdate,
    {
        self.modify(|state, store| {
            let change = update(&state.preferences);
            let preferences = state.preferences.clone().with_update(change);
            storage::write_json(store, PREFERENCES_KEY, &preferences)?;
            state.preferences = preferences;
            Ok(())
        })
    }

    /// Run `f` against a copy of the latest state and publish the copy only
    /// if `f` succeeds.
    fn modify<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut PreferencesState, &dyn KeyValueStore) -> Result<(), StorageError>,
    {
        let store = self.inner.store.as_ref();
        let mut outcome = Ok(());
        self.inner.state.send_if_modified(|state| {
            let mut next = state.clone();
            match f(&mut next, store) {
                Ok(()) => {
                    let changed = *state != next;
                    *state = next;
                    changed
                }
                Err(e) => {
                    outcome = Err(e);
                    false
                }
            }
        });
        outcome
    }
}

fn read_preferences(store: &dyn KeyValueStore) -> Result<UserPreferences, StorageError> {
    let Some(raw) = store.get(PREFERENCES_KEY)? else {
        return Ok(UserPreferences::default());
    };

    let migrated = serde_json::from_str::<Value>(&raw).and_then(UserPreferences::from_stored);
    Ok(migrated.unwrap_or_else(|e| {
        warn!(error = %e, "stored preferences are unreadable, using defaults");
        UserPreferences::default()
    }))
}

fn read_onboarding_flag(store: &dyn KeyValueStore) -> Result<bool, StorageError> {
    match storage::read_json::<bool>(store, ONBOARDING_KEY) {
        Ok(flag) => Ok(flag.unwrap_or(false)),
        Err(StorageError::Json { source, .. }) => {
            warn!(error = %source, "stored onboarding flag is unreadable");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use cookmate_core::ChefSkillLevel;
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStore;

    fn service() -> (Arc<MemoryStore>, PreferencesService) {
        let store = Arc::new(MemoryStore::new());
        let service = PreferencesService::new(store.clone());
        (store, service)
    }

    #[test]
    fn test_load_installs_defaults_when_empty() {
        let (_, service) = service();
        assert!(service.snapshot().loading);

        service.load().expect("load");
        let state = service.snapshot();
        assert!(!state.loading);
        assert!(!state.onboarding_complete);
        assert_eq!(state.preferences, UserPreferences::default());
    }

    #[test]
    fn test_load_migrates_legacy_record() {
        let (store, service) = service();
        store
            .set(
                PREFERENCES_KEY,
                r#"{"dietaryRequirements":[],"kitchenUtensils":"Air Fryer","chefSkillLevel":"Intermediate","servings":3,"weeklyBudget":75}"#,
            )
            .expect("seed");
        store.set(ONBOARDING_KEY, "true").expect("seed");

        service.load().expect("load");
        let state = service.snapshot();
        assert!(state.onboarding_complete);
        assert_eq!(
            state.preferences.kitchen_utensils,
            BTreeSet::from([KitchenUtensil::AirFryer])
        );
        assert_eq!(
            state.preferences.dietary_requirements,
            BTreeSet::from([DietRequirement::None])
        );
        assert_eq!(state.preferences.chef_skill_level, ChefSkillLevel::Intermediate);
    }

    #[test]
    fn test_load_tolerates_corrupt_records() {
        let (store, service) = service();
        store.set(PREFERENCES_KEY, "{oops").expect("seed");
        store.set(ONBOARDING_KEY, "maybe").expect("seed");

        service.load().expect("load");
        let state = service.snapshot();
        assert_eq!(state.preferences, UserPreferences::default());
        assert!(!state.onboarding_complete);
        assert!(!state.loading);
    }

    #[test]
    fn test_save_coerces_and_persists() {
        let (store, service) = service();
        service.load().expect("load");

        let mut prefs = UserPreferences::default();
        prefs.kitchen_utensils.clear();
        prefs.servings = 6;
        service.save_preferences(prefs).expect("save");

        let saved = service.preferences();
        assert_eq!(saved.kitchen_utensils, BTreeSet::from([KitchenUtensil::BasicSet]));
        assert_eq!(saved.servings, 6);

        let stored: UserPreferences = storage::read_json(store.as_ref(), PREFERENCES_KEY)
            .expect("read")
            .expect("stored");
        assert_eq!(stored, saved);
    }

    #[test]
    fn test_sets_never_observed_empty() {
        let (_, service) = service();
        service.load().expect("load");
        let mut rx = service.subscribe();

        let updates = [
            PreferenceUpdate::KitchenUtensils(BTreeSet::new()),
            PreferenceUpdate::DietaryRequirements(BTreeSet::new()),
            PreferenceUpdate::KitchenUtensils(BTreeSet::from([KitchenUtensil::Oven])),
            PreferenceUpdate::DietaryRequirements(BTreeSet::from([DietRequirement::Vegan])),
            PreferenceUpdate::KitchenUtensils(BTreeSet::new()),
        ];
        for update in updates {
            service.update_preference(update).expect("update");
            let state = rx.borrow_and_update().clone();
            assert!(!state.preferences.kitchen_utensils.is_empty());
            assert!(!state.preferences.dietary_requirements.is_empty());
        }
    }

    #[test]
    fn test_updates_merge_into_latest_state() {
        let (_, service) = service();
        service.load().expect("load");
        let other_handle = service.clone();

        service
            .update_preference(PreferenceUpdate::Servings(4))
            .expect("update");
        other_handle
            .update_preference(PreferenceUpdate::WeeklyBudget(Decimal::from(80)))
            .expect("update");

        let prefs = service.preferences();
        assert_eq!(prefs.servings, 4);
        assert_eq!(prefs.weekly_budget, Decimal::from(80));
    }

    #[test]
    fn test_toggles_from_two_handles_both_land() {
        let (store, service) = service();
        service.load().expect("load");
        let other_handle = service.clone();

        service.toggle_diet(DietRequirement::Vegan).expect("toggle");
        other_handle.toggle_diet(DietRequirement::Keto).expect("toggle");
        other_handle
            .toggle_utensil(KitchenUtensil::Oven)
            .expect("toggle");
        service.toggle_utensil(KitchenUtensil::Grill).expect("toggle");

        let prefs = service.preferences();
        assert_eq!(
            prefs.dietary_requirements,
            BTreeSet::from([
                DietRequirement::Keto,
                DietRequirement::Vegan,
                DietRequirement::None
            ])
        );
        assert_eq!(
            prefs.kitchen_utensils,
            BTreeSet::from([
                KitchenUtensil::BasicSet,
                KitchenUtensil::Oven,
                KitchenUtensil::Grill
            ])
        );

        let stored: UserPreferences = storage::read_json(store.as_ref(), PREFERENCES_KEY)
            .expect("read")
            .expect("stored");
        assert_eq!(stored, prefs);
    }

    #[test]
    fn test_toggling_last_utensil_restores_basic_set() {
        let (_, service) = service();
        service.load().expect("load");
        service
            .toggle_utensil(KitchenUtensil::BasicSet)
            .expect("toggle");
        assert_eq!(
            service.preferences().kitchen_utensils,
            BTreeSet::from([KitchenUtensil::BasicSet])
        );
    }

    #[test]
    fn test_subscribers_are_notified() {
        let (_, service) = service();
        let mut rx = service.subscribe();
        service.load().expect("load");
        assert!(rx.has_changed().expect("sender alive"));
        rx.mark_unchanged();

        service.complete_onboarding().expect("complete");
        assert!(rx.has_changed().expect("sender alive"));
        assert!(rx.borrow_and_update().onboarding_complete);

        // Completing again changes nothing
        service.complete_onboarding().expect("complete");
        assert!(!rx.has_changed().expect("sender alive"));
    }

    #[test]
    fn test_reset_onboarding_erases_keys() {
        let (store, service) = service();
        service.load().expect("load");
        service
            .update_preference(PreferenceUpdate::ChefSkillLevel(ChefSkillLevel::Advanced))
            .expect("update");
        service.complete_onboarding().expect("complete");
        assert!(store.contains(PREFERENCES_KEY));
        assert!(store.contains(ONBOARDING_KEY));

        service.reset_onboarding().expect("reset");
        assert!(!store.contains(PREFERENCES_KEY));
        assert!(!store.contains(ONBOARDING_KEY));

        let state = service.snapshot();
        assert!(!state.onboarding_complete);
        assert_eq!(state.preferences, UserPreferences::default());
    }
}
