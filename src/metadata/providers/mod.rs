//! Concrete trailer provider implementations.
//!
//! Each submodule wraps a single external API and implements the
//! [`TrailerProvider`](super::TrailerProvider) trait.

pub mod tmdb;

pub use tmdb::TmdbProvider;
