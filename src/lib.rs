//! Shatter the Ice - roommate compatibility service
//!
//! This library scores how well two students would get along as roommates.
//! It combines a hard-filter gate, a lifestyle preference comparator and an
//! interest score from a pluggable scorer, and memoizes interest matches per
//! user pair.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    calculate_combined_roommate_score, calculate_roommate_compatibility, passes_hard_filters,
    MatchPolicy, Matcher,
};
pub use models::{InterestMatch, MatchCacheEntry, PairKey, RoommatePreferences, User};
pub use services::{CompatibilityService, MatchCache};
