//! Core types and trait definitions for Strata.
//!
//! Strata stores hierarchical documents as flat subject–predicate–object–
//! context records in an external triple store. This crate holds the pieces
//! every other crate shares: the [`Triple`](triple::Triple) record, prefix
//! queries, the predicate path codec, and the [`TripleStore`](store::TripleStore)
//! abstraction. It has no HTTP or XML dependencies.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod key;
pub mod path;
pub mod store;
pub mod triple;

pub use error::{Error, Result};
