use crate::core::interests::{assemble_match, clean_interests, pair_interests};
use crate::models::{InterestMatch, RelatedInterest};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when scoring interests
#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Scorer returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Source of interest compatibility between two users
///
/// Scores are directional: shared interests are reported in the viewer's
/// spelling and related pairs list the viewer's interest first. Cached results
/// read by the other member go through [`orient_for_viewer`].
///
/// [`orient_for_viewer`]: crate::core::orient_for_viewer
#[async_trait]
pub trait InterestScorer: Send + Sync {
    async fn score_interests(
        &self,
        viewer: &[String],
        target: &[String],
    ) -> Result<InterestMatch, ScorerError>;

    /// Forget any memoized results
    fn reset(&self) {}
}

#[async_trait]
impl<S: InterestScorer + ?Sized> InterestScorer for Arc<S> {
    async fn score_interests(
        &self,
        viewer: &[String],
        target: &[String],
    ) -> Result<InterestMatch, ScorerError> {
        (**self).score_interests(viewer, target).await
    }

    fn reset(&self) {
        (**self).reset()
    }
}

/// Clean both interest lists and score them
///
/// When either side has no usable interests the result is an empty match
/// with score 0 and the scorer is not called.
pub async fn score_pair(
    scorer: &dyn InterestScorer,
    viewer: &[String],
    target: &[String],
) -> Result<InterestMatch, ScorerError> {
    let viewer = clean_interests(viewer);
    let target = clean_interests(target);

    if viewer.is_empty() || target.is_empty() {
        tracing::warn!("Empty or invalid interests, returning a 0% match");
        return Ok(InterestMatch::empty());
    }

    scorer.score_interests(&viewer, &target).await
}

/// Request body sent to the remote scoring service
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScoreRequest<'a> {
    interests_a: &'a [String],
    interests_b: &'a [String],
}

/// One scored pair, referring to interests by position in the request lists
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoredPair {
    user1_index: usize,
    user2_index: usize,
    score: f64,
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoreReply {
    #[serde(default)]
    matches: Vec<ScoredPair>,
    #[serde(default)]
    overall_compatibility: f64,
}

/// Interest scorer backed by an external scoring service over HTTP
pub struct RemoteInterestScorer {
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl RemoteInterestScorer {
    /// Create a new remote scorer
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ScorerError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            api_key,
            client,
        })
    }

    fn score_url(&self) -> String {
        format!("{}/score", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl InterestScorer for RemoteInterestScorer {
    async fn score_interests(
        &self,
        viewer: &[String],
        target: &[String],
    ) -> Result<InterestMatch, ScorerError> {
        let url = self.score_url();
        tracing::debug!("Scoring {} x {} interests via {}", viewer.len(), target.len(), url);

        let mut request = self.client.post(&url).json(&ScoreRequest {
            interests_a: viewer,
            interests_b: target,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(ScorerError::ApiError(format!(
                "Failed to score interests: {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let reply: ScoreReply = serde_json::from_str(&body)
            .map_err(|e| {
                ScorerError::InvalidResponse(format!("Failed to parse score reply: {}", e))
            })?;

        // Map indices back to the original interest names
        let pairs = reply
            .matches
            .into_iter()
            .filter_map(|m| match (viewer.get(m.user1_index), target.get(m.user2_index)) {
                (Some(a), Some(b)) => Some(RelatedInterest {
                    user_interest: a.clone(),
                    target_interest: b.clone(),
                    relationship: m.reason,
                    score: Some(m.score),
                }),
                _ => {
                    tracing::warn!(
                        "Invalid indices in score reply: [{}] or [{}]",
                        m.user1_index,
                        m.user2_index
                    );
                    None
                }
            })
            .collect();

        let result = assemble_match(reply.overall_compatibility, pairs);
        tracing::info!(
            "Interest score {} ({} shared, {} related)",
            result.score,
            result.shared_interests.len(),
            result.related_interests.len()
        );
        Ok(result)
    }
}

/// Offline interest scorer built on the local string heuristic
///
/// The overall score is the mean, over the viewer's interests, of the best
/// pairing score each one found (unpaired interests count as 0).
#[derive(Debug, Clone, Default)]
pub struct HeuristicInterestScorer;

#[async_trait]
impl InterestScorer for HeuristicInterestScorer {
    async fn score_interests(
        &self,
        viewer: &[String],
        target: &[String],
    ) -> Result<InterestMatch, ScorerError> {
        if viewer.is_empty() {
            return Ok(InterestMatch::empty());
        }

        let pairs = pair_interests(viewer, target);
        let total: f64 = pairs.iter().map(|p| f64::from(p.score)).sum();
        let score = total / viewer.len() as f64;

        let related = pairs
            .into_iter()
            .map(|p| {
                let relationship =
                    if p.score == 100 { "same interest" } else { "similar interests" };
                RelatedInterest {
                    relationship: relationship.to_string(),
                    user_interest: p.viewer,
                    target_interest: p.target,
                    score: Some(f64::from(p.score)),
                }
            })
            .collect();

        Ok(assemble_match(score, related))
    }
}

/// Memoizes another scorer in process memory
///
/// Keys are the two sorted interest lists, in viewer/target order. Entries
/// never expire; only [`InterestScorer::reset`] clears them.
pub struct MemoizedScorer<S> {
    inner: S,
    memo: moka::future::Cache<String, InterestMatch>,
}

impl<S: InterestScorer> MemoizedScorer<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            memo: moka::future::Cache::builder().build(),
        }
    }

    /// Number of memoized results
    pub fn len(&self) -> u64 {
        self.memo.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn memo_key(viewer: &[String], target: &[String]) -> Result<String, ScorerError> {
        let mut viewer = viewer.to_vec();
        let mut target = target.to_vec();
        viewer.sort();
        target.sort();

        serde_json::to_string(&(viewer, target))
            .map_err(|e| ScorerError::InvalidResponse(format!("Failed to build memo key: {}", e)))
    }
}

#[async_trait]
impl<S: InterestScorer> InterestScorer for MemoizedScorer<S> {
    async fn score_interests(
        &self,
        viewer: &[String],
        target: &[String],
    ) -> Result<InterestMatch, ScorerError> {
        let key = Self::memo_key(viewer, target)?;

        if let Some(hit) = self.memo.get(&key).await {
            tracing::debug!("Interest memo hit");
            return Ok(hit);
        }

        let result = self.inner.score_interests(viewer, target).await?;
        self.memo.insert(key, result.clone()).await;
        Ok(result)
    }

    fn reset(&self) {
        self.memo.invalidate_all();
        self.inner.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[derive(Default)]
    struct CountingScorer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl InterestScorer for CountingScorer {
        async fn score_interests(
            &self,
            _viewer: &[String],
            _target: &[String],
        ) -> Result<InterestMatch, ScorerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(InterestMatch {
                score: 77.7,
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn test_empty_interests_skip_scorer() {
        let scorer = CountingScorer::default();

        let result = score_pair(&scorer, &strings(&["ok", "  "]), &strings(&["chess"]))
            .await
            .unwrap();

        assert_eq!(result.score, 0.0);
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_memo_ignores_order_within_lists() {
        let memo = MemoizedScorer::new(Arc::new(CountingScorer::default()));

        memo.score_interests(&strings(&["chess", "anime"]), &strings(&["coding"]))
            .await
            .unwrap();
        let again = memo
            .score_interests(&strings(&["anime", "chess"]), &strings(&["coding"]))
            .await
            .unwrap();

        assert_eq!(again.score, 77.7);
        assert_eq!(memo.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_memo_reset_forces_rescore() {
        let memo = MemoizedScorer::new(Arc::new(CountingScorer::default()));
        let a = strings(&["chess"]);
        let b = strings(&["coding"]);

        memo.score_interests(&a, &b).await.unwrap();
        memo.reset();
        memo.score_interests(&a, &b).await.unwrap();

        assert_eq!(memo.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_memo_is_directional() {
        let memo = MemoizedScorer::new(Arc::new(CountingScorer::default()));
        let a = strings(&["chess"]);
        let b = strings(&["coding"]);

        memo.score_interests(&a, &b).await.unwrap();
        memo.score_interests(&b, &a).await.unwrap();

        assert_eq!(memo.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_heuristic_scorer() {
        let scorer = HeuristicInterestScorer;

        let result = scorer
            .score_interests(
                &strings(&["Chess", "anime", "surfing"]),
                &strings(&["chess", "cosplay", "baking"]),
            )
            .await
            .unwrap();

        // (100 + 80 + 0) / 3
        assert_eq!(result.score, 60.0);
        assert_eq!(result.shared_interests, strings(&["Chess"]));
        assert_eq!(result.related_interests.len(), 1);
        assert_eq!(result.related_interests[0].target_interest, "cosplay");
        assert_eq!(result.conversation_starters.len(), 3);
    }
}
