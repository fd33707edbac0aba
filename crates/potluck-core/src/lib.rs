//! Core types and trait definitions for potluck coordination.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::PotluckStore`]; clients drive a
//! [`planner::Planner`] and render the [`aggregate::Contributions`] it
//! derives from each [`planner::Snapshot`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod aggregate;
pub mod claim;
pub mod error;
pub mod event;
pub mod identity;
pub mod item;
pub mod planner;
pub mod prefs;
pub mod reconcile;
pub mod store;

pub use error::{Error, Result};
