//! Algolia recipe index search.

mod client;
mod error;
mod types;

pub use client::{AlgoliaClient, HITS_PER_PAGE};
pub use error::{AlgoliaError, ApiErrorResponse};
pub use types::{HitIngredient, RecipeHit, SearchRequest, SearchResponse};
