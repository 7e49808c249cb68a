//! Shopping list service.
//!
//! The full list is rewritten to storage on every mutation.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, warn};

use cookmate_core::{NewShoppingItem, Recipe, RecipeId, ShoppingItemId, ShoppingListItem};

use crate::storage::{self, KeyValueStore, SHOPPING_LIST_KEY, StorageError};

/// Read model published by [`ShoppingListService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListState {
    pub items: Vec<ShoppingListItem>,
    pub loading: bool,
}

impl Default for ShoppingListState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: true,
        }
    }
}

impl ShoppingListState {
    /// Items still to buy, in list order.
    pub fn pending(&self) -> impl Iterator<Item = &ShoppingListItem> {
        self.items.iter().filter(|item| !item.is_checked)
    }

    /// Items already ticked off, in list order.
    pub fn completed(&self) -> impl Iterator<Item = &ShoppingListItem> {
        self.items.iter().filter(|item| item.is_checked)
    }
}

/// Owns the shopping list.
#[derive(Clone)]
pub struct ShoppingListService {
    inner: Arc<ShoppingListInner>,
}

struct ShoppingListInner {
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<ShoppingListState>,
}

impl ShoppingListService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(ShoppingListState::default());
        Self {
            inner: Arc::new(ShoppingListInner { store, state }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> ShoppingListState {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn items(&self) -> Vec<ShoppingListItem> {
        self.inner.state.borrow().items.clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ShoppingListState> {
        self.inner.state.subscribe()
    }

    /// Restore the list from storage. A corrupt record yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be read.
    pub fn load(&self) -> Result<(), StorageError> {
        let loaded = match storage::read_json::<Vec<ShoppingListItem>>(
            self.inner.store.as_ref(),
            SHOPPING_LIST_KEY,
        ) {
            Ok(items) => Ok(items.unwrap_or_default()),
            Err(StorageError::Json { source, .. }) => {
                warn!(error = %source, "stored shopping list is unreadable, starting empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        };

        let items = loaded.as_ref().map(Clone::clone).unwrap_or_default();
        debug!(count = items.len(), "shopping list loaded");
        self.inner.state.send_replace(ShoppingListState {
            items,
            loading: false,
        });
        loaded.map(|_| ())
    }

    /// Append an item under a fresh timestamp id, unchecked.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be persisted.
    pub fn add_item(&self, item: NewShoppingItem) -> Result<ShoppingItemId, StorageError> {
        let mut id = ShoppingItemId::new(String::new());
        self.modify(|items| {
            id = unique_id(items, Utc::now().timestamp_millis().to_string());
            items.push(item.into_item(id.clone()));
        })?;
        Ok(id)
    }

    /// Add a manually typed item.
    ///
    /// Returns `Ok(None)` without touching the list when `name` is blank.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be persisted.
    pub fn add_manual(
        &self,
        name: &str,
        quantity: &str,
    ) -> Result<Option<ShoppingItemId>, StorageError> {
        NewShoppingItem::manual(name, quantity)
            .map(|item| self.add_item(item))
            .transpose()
    }

    /// Add a batch of recipe ingredients.
    ///
    /// Existing items with the same name and recipe are replaced, so adding
    /// the same recipe twice leaves a single copy of its ingredients. Items
    /// without a recipe are never touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be persisted.
    pub fn add_recipe_ingredients(&self, batch: Vec<NewShoppingItem>) -> Result<(), StorageError> {
        if batch.is_empty() {
            return Ok(());
        }

        let keys: HashSet<(String, RecipeId)> = batch
            .iter()
            .filter_map(|item| {
                item.recipe_id
                    .as_ref()
                    .map(|recipe_id| (item.name.clone(), recipe_id.clone()))
            })
            .collect();

        self.modify(|items| {
            items.retain(|existing| {
                existing
                    .recipe_key()
                    .is_none_or(|key| !keys.contains(&key))
            });

            let timestamp = Utc::now().timestamp_millis();
            for item in batch {
                let base = match &item.recipe_id {
                    Some(recipe_id) => format!("{}-{recipe_id}-{timestamp}", item.name),
                    None => format!("{}-{timestamp}", item.name),
                };
                let id = unique_id(items, base);
                items.push(item.into_item(id));
            }
        })
    }

    /// Add every ingredient of `recipe`.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be persisted.
    pub fn add_recipe(&self, recipe: &Recipe) -> Result<(), StorageError> {
        self.add_recipe_ingredients(recipe.shopping_items())
    }

    /// Remove the item with `id`. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be persisted.
    pub fn remove_item(&self, id: &ShoppingItemId) -> Result<(), StorageError> {
        self.modify(|items| items.retain(|item| &item.id != id))
    }

    /// Flip the checked flag of the item with `id`. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be persisted.
    pub fn toggle_item(&self, id: &ShoppingItemId) -> Result<(), StorageError> {
        self.modify(|items| {
            if let Some(item) = items.iter_mut().find(|item| &item.id == id) {
                item.is_checked = !item.is_checked;
            }
        })
    }

    /// Empty the list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be persisted.
    pub fn clear_list(&self) -> Result<(), StorageError> {
        self.modify(Vec::clear)
    }

    /// Apply `f` to a copy of the list, persist it, then publish it.
    fn modify<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Vec<ShoppingListItem>),
    {
        let store = self.inner.store.as_ref();
        let mut outcome = Ok(());
        self.inner.state.send_if_modified(|state| {
            let mut items = state.items.clone();
            f(&mut items);
            if let Err(e) = storage::write_json(store, SHOPPING_LIST_KEY, &items) {
                outcome = Err(e);
                return false;
            }
            let changed = state.items != items;
            state.items = items;
            changed
        });
        outcome
    }
}

/// `base`, or `base-N` for the smallest `N` not already used in `items`.
fn unique_id(items: &[ShoppingListItem], base: String) -> ShoppingItemId {
    let taken = |candidate: &str| items.iter().any(|item| item.id.as_str() == candidate);
    if !taken(&base) {
        return ShoppingItemId::new(base);
    }
    let mut n = 1u32;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return ShoppingItemId::new(candidate);
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use cookmate_core::catalog;

    use super::*;
    use crate::storage::MemoryStore;

    fn service() -> (Arc<MemoryStore>, ShoppingListService) {
        let store = Arc::new(MemoryStore::new());
        let list = ShoppingListService::new(store.clone());
        list.load().expect("load");
        (store, list)
    }

    fn stored(store: &MemoryStore) -> Vec<ShoppingListItem> {
        storage::read_json(store, SHOPPING_LIST_KEY)
            .expect("read")
            .unwrap_or_default()
    }

    fn recipe(id: &str) -> &'static Recipe {
        catalog::find(&RecipeId::new(id)).expect("catalog recipe")
    }

    #[test]
    fn test_add_manual_item() {
        let (store, list) = service();
        let id = list
            .add_manual("  Milk ", "")
            .expect("add")
            .expect("non-blank name");

        let items = list.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].name, "Milk");
        assert_eq!(items[0].quantity, "1");
        assert!(!items[0].is_checked);
        assert_eq!(stored(&store), items);
    }

    #[test]
    fn test_blank_manual_item_is_ignored() {
        let (store, list) = service();
        assert_eq!(list.add_manual("   ", "3").expect("add"), None);
        assert!(list.items().is_empty());
        assert!(!store.contains(SHOPPING_LIST_KEY));
    }

    #[test]
    fn test_manual_ids_stay_unique() {
        let (_, list) = service();
        let a = list.add_manual("Eggs", "6").expect("add").expect("id");
        let b = list.add_manual("Flour", "1").expect("add").expect("id");
        let c = list.add_manual("Sugar", "1").expect("add").expect("id");
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_add_recipe_twice_is_idempotent() {
        let (store, list) = service();
        list.add_manual("Coffee", "1").expect("add");
        let pasta = recipe("1");

        list.add_recipe(pasta).expect("first add");
        list.add_recipe(pasta).expect("second add");

        let items = list.items();
        assert_eq!(items.len(), pasta.ingredients.len() + 1);
        assert_eq!(items[0].name, "Coffee");
        let from_recipe = items
            .iter()
            .filter(|item| item.recipe_id.as_ref() == Some(&pasta.id))
            .count();
        assert_eq!(from_recipe, pasta.ingredients.len());
        assert_eq!(stored(&store), items);
    }

    #[test]
    fn test_shared_ingredients_of_other_recipes_survive() {
        let (_, list) = service();
        // Olive Oil appears in both recipes
        list.add_recipe(recipe("1")).expect("add");
        list.add_recipe(recipe("3")).expect("add");
        list.add_recipe(recipe("3")).expect("add again");

        let olive_oil: Vec<_> = list
            .items()
            .into_iter()
            .filter(|item| item.name == "Olive Oil")
            .collect();
        assert_eq!(olive_oil.len(), 2);
    }

    #[test]
    fn test_recipe_item_ids_are_unique() {
        let (_, list) = service();
        let batch = vec![
            NewShoppingItem {
                name: "Salt".to_string(),
                quantity: "1".to_string(),
                unit: None,
                recipe_id: Some(RecipeId::new("9")),
            };
            2
        ];
        list.add_recipe_ingredients(batch).expect("add");

        let items = list.items();
        assert_eq!(items.len(), 2);
        assert_ne!(items[0].id, items[1].id);
        assert!(items[0].id.as_str().starts_with("Salt-9-"));
    }

    #[test]
    fn test_toggle_twice_restores_flag() {
        let (store, list) = service();
        let id = list.add_manual("Bread", "1").expect("add").expect("id");

        list.toggle_item(&id).expect("toggle");
        assert!(list.items()[0].is_checked);
        assert!(stored(&store)[0].is_checked);

        list.toggle_item(&id).expect("toggle");
        assert!(!list.items()[0].is_checked);
        assert!(!stored(&store)[0].is_checked);
    }

    #[test]
    fn test_pending_and_completed_split() {
        let (_, list) = service();
        let bread = list.add_manual("Bread", "1").expect("add").expect("id");
        list.add_manual("Jam", "1").expect("add");
        list.toggle_item(&bread).expect("toggle");

        let state = list.snapshot();
        let pending: Vec<_> = state.pending().map(|i| i.name.as_str()).collect();
        let completed: Vec<_> = state.completed().map(|i| i.name.as_str()).collect();
        assert_eq!(pending, ["Jam"]);
        assert_eq!(completed, ["Bread"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let (store, list) = service();
        let bread = list.add_manual("Bread", "1").expect("add").expect("id");
        list.add_recipe(recipe("2")).expect("add");

        list.remove_item(&bread).expect("remove");
        assert!(list.items().iter().all(|item| item.id != bread));

        list.remove_item(&ShoppingItemId::new("missing")).expect("remove unknown");

        list.clear_list().expect("clear");
        assert!(list.items().is_empty());
        assert!(stored(&store).is_empty());
    }

    #[test]
    fn test_load_restores_persisted_list() {
        let (store, list) = service();
        list.add_recipe(recipe("4")).expect("add");

        let reloaded = ShoppingListService::new(store.clone());
        reloaded.load().expect("load");
        assert_eq!(reloaded.items(), list.items());
    }

    #[test]
    fn test_load_tolerates_corrupt_list() {
        let store = Arc::new(MemoryStore::new());
        store.set(SHOPPING_LIST_KEY, "[{]").expect("seed");

        let list = ShoppingListService::new(store);
        list.load().expect("load");
        let state = list.snapshot();
        assert!(state.items.is_empty());
        assert!(!state.loading);
    }
}
