//! HTTP client for the remote triple store.
//!
//! Implements [`strata_core::store::TripleStore`] over the store's JSON API:
//!
//! - `GET  /HasKey/{prefix}` — 2xx if some key matches, 4xx if none
//! - `GET  /tuple/{prefix}`  — JSON array of matching triples
//! - `POST /tuple`           — upsert one triple (empty object deletes)

mod client;

pub mod error;

pub use client::{HttpStore, StoreConfig};
pub use error::{Error, Result};
