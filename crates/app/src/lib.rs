//! Cookmate application library.
//!
//! Services, user flows and API clients shared by every front end. Build an
//! [`AppState`] once, call [`AppState::load`], then drive the services it
//! exposes.
//!
//! # Modules
//!
//! - [`config`] - Environment configuration
//! - [`storage`] - Durable key-value store
//! - [`services`] - Auth, preferences, shopping list, search and generation
//! - [`gemini`] / [`algolia`] - HTTP clients
//! - [`routes`] - Navigation gate

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod algolia;
pub mod config;
pub mod debounce;
pub mod gemini;
pub mod routes;
pub mod schema;
pub mod services;
pub mod state;
pub mod storage;

pub use config::AppConfig;
pub use state::{AppState, AppStateError};
