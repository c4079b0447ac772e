use crate::core::{normalize_interests, orient_for_viewer, Matcher};
use crate::models::{
    CompatibilityResponse, MatchResponse, NormalizedInterests, Recommendation,
    RoommatePreferences, User,
};
use crate::services::cache::{CacheError, MatchCache};
use crate::services::scorer::{score_pair, InterestScorer, ScorerError};
use crate::services::users::{StoreError, UserStore};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the compatibility service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Match cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("User store error: {0}")]
    Store(#[from] StoreError),

    #[error("Interest scorer error: {0}")]
    Scorer(#[from] ScorerError),
}

/// Orchestrates users, the match cache, the interest scorer and the matcher
#[derive(Clone)]
pub struct CompatibilityService {
    users: Arc<dyn UserStore>,
    cache: MatchCache,
    scorer: Arc<dyn InterestScorer>,
    matcher: Matcher,
}

impl CompatibilityService {
    pub fn new(
        users: Arc<dyn UserStore>,
        cache: MatchCache,
        scorer: Arc<dyn InterestScorer>,
        matcher: Matcher,
    ) -> Self {
        Self {
            users,
            cache,
            scorer,
            matcher,
        }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    async fn load_user(&self, user_id: &str) -> Result<User, ServiceError> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::UserNotFound(user_id.to_string()))
    }

    /// Full match report for `viewer_id` looking at `target_id`
    ///
    /// The interest match comes from the cache when present (counting a hit),
    /// otherwise it is scored and stored. Interest details are only included
    /// once the reveal threshold is reached.
    pub async fn evaluate_pair(
        &self,
        viewer_id: &str,
        target_id: &str,
    ) -> Result<MatchResponse, ServiceError> {
        if viewer_id == target_id {
            return Err(ServiceError::InvalidRequest(
                "viewerId and targetUserId must differ".to_string(),
            ));
        }

        let viewer = self.load_user(viewer_id).await?;
        let target = self.load_user(target_id).await?;

        let (result, from_cache) = match self.cache.get(&viewer.id, &target.id).await? {
            Some(mut entry) => {
                self.cache.record_hit(&mut entry).await?;
                // Scored from the other side
                let result = if !entry.viewer_id.is_empty() && entry.viewer_id != viewer.id {
                    orient_for_viewer(entry.result, &viewer.interests)
                } else {
                    entry.result
                };
                (result, true)
            }
            None => {
                let result =
                    score_pair(self.scorer.as_ref(), &viewer.interests, &target.interests).await?;
                let normalized = NormalizedInterests {
                    low: normalize_interests(&viewer.interests),
                    high: normalize_interests(&target.interests),
                };
                self.cache
                    .put_with_interests(&viewer.id, &target.id, result.clone(), normalized)
                    .await?;
                (result, false)
            }
        };

        let evaluation = self.matcher.evaluate(
            viewer.roommate_preferences.as_ref(),
            target.roommate_preferences.as_ref(),
            Some(result.score),
        );

        tracing::info!(
            "Match {} -> {}: secret {}, interest {}, lifestyle {}, cached {}",
            viewer.id,
            target.id,
            evaluation.secret_score,
            evaluation.interest_score,
            evaluation.lifestyle_score,
            from_cache
        );

        let (shared_interests, related_interests, conversation_starters) =
            if evaluation.reveal_details {
                (
                    result.shared_interests,
                    result.related_interests,
                    result.conversation_starters,
                )
            } else {
                (Vec::new(), Vec::new(), Vec::new())
            };

        Ok(MatchResponse {
            secret_score: evaluation.secret_score,
            interest_score: evaluation.interest_score,
            roommate_score: evaluation.lifestyle_score,
            combined_roommate_score: evaluation.combined_roommate_score,
            is_eligible_roommate: evaluation.is_eligible_roommate,
            can_message: evaluation.can_message,
            reveal_details: evaluation.reveal_details,
            shared_interests,
            related_interests,
            conversation_starters,
            from_cache,
        })
    }

    /// Ranked roommate candidates for `user_id`
    ///
    /// Only interest scores already in the cache are used; nothing is sent to
    /// the scorer.
    pub async fn recommend(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Recommendation>, ServiceError> {
        let user = self.load_user(user_id).await?;
        let candidates = self.users.list_candidates(&user).await?;
        let cached_scores = self.cache.scores_for_user(&user.id).await?;

        let total_candidates = candidates.len();
        let limit = limit.unwrap_or(self.matcher.policy().recommendation_limit);
        let ranked = self.matcher.rank(&user, candidates, &cached_scores, limit);

        tracing::info!(
            "Returning {} recommendations for {} ({} candidates, {} cached scores)",
            ranked.len(),
            user.id,
            total_candidates,
            cached_scores.len()
        );

        Ok(ranked)
    }

    /// Score two preference records without touching any store
    pub fn score_preferences(
        &self,
        a: Option<&RoommatePreferences>,
        b: Option<&RoommatePreferences>,
        interest_score: Option<f64>,
    ) -> CompatibilityResponse {
        let evaluation = self.matcher.evaluate(a, b, interest_score);

        CompatibilityResponse {
            is_eligible_roommate: evaluation.is_eligible_roommate,
            lifestyle_score: evaluation.lifestyle_score,
            combined_roommate_score: interest_score.map(|_| evaluation.combined_roommate_score),
        }
    }

    /// Drop every cached match and every memoized interest score
    pub async fn clear_caches(&self) -> Result<u64, ServiceError> {
        let cleared = self.cache.clear().await?;
        self.scorer.reset();
        Ok(cleared)
    }
}
