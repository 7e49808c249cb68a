//! Cookmate Core - Shared domain types.
//!
//! This crate provides the types used across all Cookmate components:
//! - `app` - Services, flows and API clients
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! storage access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Users, preferences, recipes and shopping list items
//! - [`catalog`] - The built-in recipe catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;

pub use types::*;
