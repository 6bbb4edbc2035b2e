//! Feedsim Core Library
//!
//! Near-duplicate detection for feed entries: text normalization, TF-IDF
//! vectors, cosine similarity over a generic worker pool, and idempotent
//! persistence of similarity edges.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod pool;
pub mod similarity;
pub mod store;
pub mod text;
