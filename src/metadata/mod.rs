//! Trailer provider system for locating trailers via external services.
//!
//! This module defines a generic [`TrailerProvider`] trait and supporting
//! types that allow Trailforge to resolve a media item to a downloadable
//! trailer URL using external services such as TMDB.
//!
//! # Module layout
//!
//! - [`provider`] -- Trait definition and the candidate type.
//! - [`providers`] -- Concrete provider implementations (TMDB).

pub mod provider;
pub mod providers;

pub use provider::{TrailerCandidate, TrailerProvider};
pub use providers::TmdbProvider;
