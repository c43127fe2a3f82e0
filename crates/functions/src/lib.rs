//! AceBack HTTP functions.
//!
//! Backend functions for the AceBack disc-golf app: ownership-checked disc
//! deletion, a Stripe webhook that marks sticker orders paid, and a
//! transactional email relay. Built as a library so the router can be
//! driven from integration tests and the email relay from the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![recursion_limit = "256"]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
