//! Debounced recipe search with a local fallback.
//!
//! Keystrokes restart a [`SEARCH_DEBOUNCE`] timer; when it expires the term
//! is committed and searched. Searches are numbered, and only the most
//! recently committed one may touch the board or the read model. Earlier
//! searches still run to completion but their results are discarded.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use cookmate_core::{Recipe, catalog};

use crate::algolia::AlgoliaError;
use crate::debounce::Debouncer;
use crate::services::board::RecipeBoard;

/// Quiet period after the last keystroke before searching.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// A remote full-text recipe index.
pub trait RecipeIndex: Send + Sync + 'static {
    /// Whether the index can be queried at all.
    fn is_configured(&self) -> bool;

    /// Query the index, returning recipes in ranking order.
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<Recipe>, AlgoliaError>> + Send;
}

/// Message shown under the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchNotice {
    /// The index answered with zero hits.
    NoResults { term: String },
    /// The index call failed; local results are shown instead.
    RemoteFailed { message: String },
    /// No index is configured; local results are shown.
    NotConfigured,
    /// No index is configured and the local catalog has no match either.
    NoLocalResults { term: String },
}

impl SearchNotice {
    /// Whether results are degraded rather than merely empty.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        !matches!(self, Self::NoResults { .. })
    }
}

impl fmt::Display for SearchNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResults { term } => {
                write!(f, "No recipes found for \"{term}\" in our Algolia index.")
            }
            Self::RemoteFailed { message } => write!(
                f,
                "Algolia search failed. Displaying local results if any. Error: {message}"
            ),
            Self::NotConfigured => f.write_str("Algolia is not configured. Showing local results."),
            Self::NoLocalResults { term } => write!(
                f,
                "No local recipes found for \"{term}\". Algolia is not configured."
            ),
        }
    }
}

/// Read model published by [`RecipeSearch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    /// Text currently in the search box.
    pub input: String,
    /// Term of the most recent committed search.
    pub committed: String,
    pub loading: bool,
    pub notice: Option<SearchNotice>,
}

/// The search flow. Cheaply cloneable; clones share state.
pub struct RecipeSearch<I> {
    inner: Arc<SearchInner<I>>,
}

impl<I> Clone for RecipeSearch<I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SearchInner<I> {
    index: I,
    board: RecipeBoard,
    state: watch::Sender<SearchState>,
    sequence: AtomicU64,
    debouncer: Debouncer,
    delay: Duration,
}

impl<I: RecipeIndex> RecipeSearch<I> {
    #[must_use]
    pub fn new(index: I, board: RecipeBoard) -> Self {
        Self::with_delay(index, board, SEARCH_DEBOUNCE)
    }

    /// Use a custom debounce delay.
    #[must_use]
    pub fn with_delay(index: I, board: RecipeBoard, delay: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            inner: Arc::new(SearchInner {
                index,
                board,
                state,
                sequence: AtomicU64::new(0),
                debouncer: Debouncer::new(),
                delay,
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    /// Whether searches go to the remote index.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.index.is_configured()
    }

    #[must_use]
    pub fn board(&self) -> &RecipeBoard {
        &self.inner.board
    }

    /// Record a keystroke and restart the debounce timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_input(&self, input: impl Into<String>) {
        let input = input.into();
        self.inner
            .state
            .send_modify(|state| state.input.clone_from(&input));

        let search = self.clone();
        self.inner.debouncer.start(self.inner.delay, move || {
            // Detach so that a later restart cannot abort a search in flight
            tokio::spawn(async move { search.commit(input).await });
        });
    }

    /// Whether a debounced search is waiting to fire.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.debouncer.is_pending()
    }

    /// Search for `term` immediately, bypassing the debounce timer.
    #[instrument(skip(self), fields(configured = self.inner.index.is_configured()))]
    pub async fn commit(&self, term: String) {
        let sequence = self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let query = term.trim().to_string();

        if query.is_empty() {
            self.apply(sequence, |state| {
                state.committed = term;
                state.loading = false;
                state.notice = None;
                Some(catalog::all().to_vec())
            });
            return;
        }

        if !self.inner.index.is_configured() {
            let local = catalog::search_local(&query);
            debug!(results = local.len(), "local search");
            self.apply(sequence, |state| {
                state.committed = term;
                state.loading = false;
                state.notice = Some(if local.is_empty() {
                    SearchNotice::NoLocalResults { term: query }
                } else {
                    SearchNotice::NotConfigured
                });
                Some(local)
            });
            return;
        }

        self.apply(sequence, |state| {
            state.committed.clone_from(&term);
            state.loading = true;
            state.notice = None;
            None
        });

        let outcome = self.inner.index.search(&query).await;
        match outcome {
            Ok(recipes) => {
                debug!(results = recipes.len(), "remote search");
                self.apply(sequence, |state| {
                    state.loading = false;
                    state.notice = recipes
                        .is_empty()
                        .then(|| SearchNotice::NoResults { term: query });
                    Some(recipes)
                });
            }
            Err(e) => {
                warn!(error = %e, "remote search failed, falling back to local results");
                let local = catalog::search_local(&query);
                self.apply(sequence, |state| {
                    state.loading = false;
                    state.notice = Some(SearchNotice::RemoteFailed {
                        message: e.to_string(),
                    });
                    Some(local)
                });
            }
        }
    }

    /// Apply `f` and publish the recipes it returns, but only while
    /// `sequence` is the latest committed search.
    fn apply<F>(&self, sequence: u64, f: F)
    where
        F: FnOnce(&mut SearchState) -> Option<Vec<Recipe>>,
    {
        self.inner.state.send_if_modified(|state| {
            if self.inner.sequence.load(Ordering::SeqCst) != sequence {
                debug!(sequence, "discarding stale search result");
                return false;
            }
            let before = state.clone();
            if let Some(recipes) = f(state) {
                self.inner.board.replace(recipes);
            }
            *state != before
        });
    }
}
