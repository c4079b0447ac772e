// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod interests;
pub mod matcher;
pub mod scoring;

pub use distance::{hour_difference, ordinal_match};
pub use filters::passes_hard_filters;
pub use interests::{
    clean_interests, local_semantic_score, normalize_interests, orient_for_viewer, pair_interests,
};
pub use matcher::{MatchPolicy, Matcher};
pub use scoring::{
    calculate_combined_roommate_score, calculate_roommate_compatibility, calculate_secret_score,
};
