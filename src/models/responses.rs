use crate::models::RelatedInterest;
use serde::{Deserialize, Serialize};

/// Verdict for a viewer/target pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairEvaluation {
    pub is_eligible_roommate: bool,
    /// Lifestyle-only compatibility, 0-100
    pub lifestyle_score: u8,
    /// Interests and lifestyle combined, one decimal
    pub combined_roommate_score: f64,
    /// Ranking score, never shown to users
    pub secret_score: u8,
    pub interest_score: f64,
    pub has_interest_score: bool,
    pub can_message: bool,
    pub reveal_details: bool,
}

/// Response for the match endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub secret_score: u8,
    pub interest_score: f64,
    pub roommate_score: u8,
    pub combined_roommate_score: f64,
    pub is_eligible_roommate: bool,
    pub can_message: bool,
    pub reveal_details: bool,
    pub shared_interests: Vec<String>,
    pub related_interests: Vec<RelatedInterest>,
    pub conversation_starters: Vec<String>,
    pub from_cache: bool,
}

/// A ranked roommate candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub user_id: String,
    pub name: String,
    pub secret_score: u8,
    pub interest_score: f64,
    pub roommate_score: u8,
    pub can_message: bool,
    pub has_preferences: bool,
}

/// Response for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
    pub total_results: usize,
}

/// Response for the stateless compatibility endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityResponse {
    pub is_eligible_roommate: bool,
    pub lifestyle_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_roommate_score: Option<f64>,
}

/// Response for the cache clearing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearCacheResponse {
    pub cleared: u64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
