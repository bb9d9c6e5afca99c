//! Trailforge - finds and fetches missing trailers in a media library
//!
//! This library crate exposes the core functionality for integration testing.

pub mod cache;
pub mod classify;
pub mod config;
pub mod download;
pub mod error;
pub mod fetch;
pub mod fixup;
pub mod metadata;
pub mod scanner;
pub mod search;
pub mod trailer;
pub mod types;

pub use error::{Error, Result};
