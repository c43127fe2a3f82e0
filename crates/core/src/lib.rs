//! AceBack Core - Shared types library.
//!
//! This crate provides common types used across the AceBack backend:
//! - `functions` - HTTP functions (disc deletion, Stripe webhook, email relay)
//! - `cli` - Command-line tools for migrations and operational tasks
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money amounts, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
