use crate::core::{
    filters::passes_hard_filters,
    scoring::{
        calculate_combined_roommate_score, calculate_roommate_compatibility,
        calculate_secret_score,
    },
};
use crate::models::{PairEvaluation, Recommendation, RoommatePreferences, User};
use std::collections::HashMap;

/// Thresholds and limits the matcher works with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    /// Interest score needed before two users may message each other
    pub message_threshold: f64,
    /// Interest score needed before shared interests are revealed
    pub reveal_threshold: f64,
    /// Interest score assumed for ranking when none has been computed yet
    pub default_interest_score: f64,
    /// Recommendations returned when the caller gives no limit
    pub recommendation_limit: usize,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            message_threshold: 70.0,
            reveal_threshold: 40.0,
            default_interest_score: 50.0,
            recommendation_limit: 20,
        }
    }
}

/// Combines the hard-filter gate, lifestyle scoring and an interest score
/// into a verdict for a user pair, and ranks candidate roommates.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    policy: MatchPolicy,
}

impl Matcher {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    /// Evaluate a viewer/target pair
    ///
    /// `interest_score` is `None` when no interest match has been computed for
    /// the pair; the policy default is then used for the combined and secret
    /// scores and messaging stays locked.
    pub fn evaluate(
        &self,
        viewer: Option<&RoommatePreferences>,
        target: Option<&RoommatePreferences>,
        interest_score: Option<f64>,
    ) -> PairEvaluation {
        let has_interest_score = interest_score.is_some();
        let interest = interest_score.unwrap_or(self.policy.default_interest_score);

        let lifestyle_score = calculate_roommate_compatibility(viewer, target);

        PairEvaluation {
            is_eligible_roommate: passes_hard_filters(viewer, target),
            lifestyle_score,
            combined_roommate_score: calculate_combined_roommate_score(interest, viewer, target),
            secret_score: calculate_secret_score(interest, lifestyle_score),
            interest_score: interest,
            has_interest_score,
            can_message: has_interest_score && interest >= self.policy.message_threshold,
            reveal_details: has_interest_score && interest >= self.policy.reveal_threshold,
        }
    }

    /// Rank candidate roommates for `user`
    ///
    /// # Pipeline
    /// 1. Drop the user themself
    /// 2. Drop candidates failing the hard filters (only when both sides have
    ///    a preference record, incomplete profiles stay in)
    /// 3. Score with the cached interest score, or the policy default
    /// 4. Sort by secret score (descending), then user id
    pub fn rank(
        &self,
        user: &User,
        candidates: Vec<User>,
        cached_scores: &HashMap<String, f64>,
        limit: usize,
    ) -> Vec<Recommendation> {
        let own_prefs = user.roommate_preferences.as_ref();

        let mut ranked: Vec<Recommendation> = candidates
            .into_iter()
            .filter(|candidate| candidate.id != user.id)
            .filter(|candidate| {
                let theirs = candidate.roommate_preferences.as_ref();
                own_prefs.is_none() || theirs.is_none() || passes_hard_filters(own_prefs, theirs)
            })
            .map(|candidate| {
                let evaluation = self.evaluate(
                    own_prefs,
                    candidate.roommate_preferences.as_ref(),
                    cached_scores.get(&candidate.id).copied(),
                );

                Recommendation {
                    has_preferences: candidate
                        .roommate_preferences
                        .as_ref()
                        .is_some_and(RoommatePreferences::is_filled),
                    user_id: candidate.id,
                    name: candidate.name,
                    secret_score: evaluation.secret_score,
                    interest_score: evaluation.interest_score,
                    roommate_score: evaluation.lifestyle_score,
                    can_message: evaluation.can_message,
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.secret_score
                .cmp(&a.secret_score)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });

        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, GenderPreference, Pets, SleepSchedule};

    fn create_user(id: &str, prefs: Option<RoommatePreferences>) -> User {
        User {
            id: id.to_string(),
            name: format!("User {}", id),
            school_id: Some("berkeley".to_string()),
            interests: vec!["chess".to_string()],
            roommate_preferences: prefs,
        }
    }

    #[test]
    fn test_evaluate_with_interest_score() {
        let matcher = Matcher::default();
        let empty = RoommatePreferences::default();

        let result = matcher.evaluate(Some(&empty), Some(&empty), Some(80.0));

        assert!(result.is_eligible_roommate);
        assert_eq!(result.lifestyle_score, 43);
        assert_eq!(result.secret_score, 65);
        assert!((result.combined_roommate_score - 65.2).abs() < 1e-9);
        assert!(result.can_message);
        assert!(result.reveal_details);
    }

    #[test]
    fn test_evaluate_without_interest_score() {
        let matcher = Matcher::default();

        let result = matcher.evaluate(None, None, None);

        assert!(!result.is_eligible_roommate);
        assert!(!result.has_interest_score);
        assert!(!result.can_message);
        assert_eq!(result.interest_score, 50.0);
        assert_eq!(result.secret_score, 50);
    }

    #[test]
    fn test_message_threshold_boundary() {
        let matcher = Matcher::default();

        assert!(matcher.evaluate(None, None, Some(70.0)).can_message);
        assert!(!matcher.evaluate(None, None, Some(69.9)).can_message);
    }

    #[test]
    fn test_rank_filters_and_sorts() {
        let matcher = Matcher::default();
        let user = create_user(
            "me",
            Some(RoommatePreferences {
                gender: Some(Gender::Female),
                gender_preference: Some(GenderPreference::Female),
                pets: Some(Pets::Allergic),
                sleep_schedule: Some(SleepSchedule::EarlyRiser),
                ..Default::default()
            }),
        );

        let candidates = vec![
            create_user("me", None),
            create_user(
                "wrong-gender",
                Some(RoommatePreferences {
                    gender: Some(Gender::Male),
                    ..Default::default()
                }),
            ),
            create_user(
                "cat-owner",
                Some(RoommatePreferences {
                    gender: Some(Gender::Female),
                    pets: Some(Pets::HasPets),
                    ..Default::default()
                }),
            ),
            create_user(
                "good",
                Some(RoommatePreferences {
                    gender: Some(Gender::Female),
                    sleep_schedule: Some(SleepSchedule::EarlyRiser),
                    ..Default::default()
                }),
            ),
            create_user("no-prefs", None),
        ];

        let cached = HashMap::from([("no-prefs".to_string(), 90.0)]);
        let ranked = matcher.rank(&user, candidates, &cached, 10);

        let ids: Vec<&str> = ranked.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(ids, vec!["no-prefs", "good"]);
        assert!(ranked[0].can_message);
        assert!(!ranked[1].can_message);
        assert!(!ranked[0].has_preferences);
    }

    #[test]
    fn test_rank_respects_limit() {
        let matcher = Matcher::default();
        let user = create_user("me", None);
        let candidates: Vec<User> = (0..30).map(|i| create_user(&i.to_string(), None)).collect();

        let ranked = matcher.rank(&user, candidates, &HashMap::new(), 5);

        assert_eq!(ranked.len(), 5);
    }
}
