//! Core types, the persistence-gateway trait and the investigation lifecycle
//! engine for the aerosafe safety-management system.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; storage backends implement
//! [`store::SafetyStore`] and the HTTP layer drives [`engine::Engine`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod action;
pub mod aircraft;
pub mod clock;
pub mod engine;
pub mod error;
pub mod fleet;
pub mod investigation;
pub mod lifecycle;
pub mod occurrence;
pub mod profile;
pub mod reconcile;
pub mod report;
pub mod store;
pub mod trailer;

pub use engine::Engine;
pub use error::{Error, Result};
