use crate::models::RoommatePreferences;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to compute the match between two users
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "viewer_id", rename = "viewerId")]
    pub viewer_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "target_user_id", rename = "targetUserId")]
    pub target_user_id: String,
}

/// Query string for the recommendations endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RecommendationsQuery {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
}

/// Score two preference records directly, without touching any store
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityRequest {
    #[serde(default)]
    pub preferences_a: Option<RoommatePreferences>,
    #[serde(default)]
    pub preferences_b: Option<RoommatePreferences>,
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default)]
    pub interest_score: Option<f64>,
}
