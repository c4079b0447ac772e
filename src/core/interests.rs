use crate::models::{InterestMatch, RelatedInterest};
use std::collections::HashSet;

/// Interests shorter than this (after trimming) are treated as junk
pub const MIN_INTEREST_LEN: usize = 3;

/// Pair scores at or above this count as a shared interest
pub const SHARED_THRESHOLD: f64 = 85.0;

/// Pair scores at or above this (and below shared) count as related
pub const RELATED_THRESHOLD: f64 = 40.0;

/// Overall score needed before conversation starters are offered
pub const STARTER_THRESHOLD: f64 = 40.0;

/// Minimum local heuristic score for two interests to be paired
pub const PAIRING_THRESHOLD: u8 = 60;

/// Known near-synonyms for the local heuristic
const NEAR_MAP: &[(&str, &str)] = &[
    ("hackathons", "coding"),
    ("anime", "cosplay"),
    ("robotics", "engineering"),
    ("scioly", "astronomy"),
    ("cs humor", "coding"),
];

/// Trim interests and drop entries too short to mean anything
pub fn clean_interests(interests: &[String]) -> Vec<String> {
    interests
        .iter()
        .map(|i| i.trim())
        .filter(|i| i.chars().count() >= MIN_INTEREST_LEN)
        .map(str::to_string)
        .collect()
}

/// Lowercased, trimmed, de-duplicated form stored alongside cached matches
pub fn normalize_interests(interests: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    clean_interests(interests)
        .into_iter()
        .map(|i| i.to_lowercase())
        .filter(|i| seen.insert(i.clone()))
        .collect()
}

/// Drop later duplicates, comparing case-insensitively and keeping the first spelling
pub fn dedup_case_insensitive(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|i| seen.insert(i.to_lowercase()))
        .collect()
}

/// Local similarity between two interests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticScore {
    pub score: u8,
    pub triggers: (String, String),
}

/// Cheap string heuristic for how related two interests are
///
/// - identical (case-insensitive): 100
/// - listed near-synonyms: 80
/// - one contains the other: 70
/// - otherwise: 0
pub fn local_semantic_score(a: &str, b: &str) -> SemanticScore {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a == b {
        return SemanticScore { score: 100, triggers: (a, b) };
    }

    if let Some((x, y)) = NEAR_MAP
        .iter()
        .find(|(x, y)| (a == *x && b == *y) || (a == *y && b == *x))
    {
        return SemanticScore {
            score: 80,
            triggers: (x.to_string(), y.to_string()),
        };
    }

    let score = if a.contains(&b) || b.contains(&a) { 70 } else { 0 };
    SemanticScore { score, triggers: (a, b) }
}

/// A viewer interest paired with its best counterpart
#[derive(Debug, Clone, PartialEq)]
pub struct InterestPair {
    pub viewer: String,
    pub target: String,
    pub score: u8,
}

/// Greedily pair each viewer interest with its best unused target interest
///
/// Pairs scoring below [`PAIRING_THRESHOLD`] are discarded. Each target
/// interest is used at most once.
pub fn pair_interests(viewer: &[String], target: &[String]) -> Vec<InterestPair> {
    let mut used = vec![false; target.len()];
    let mut pairs = Vec::new();

    for a in viewer {
        let mut best: Option<(usize, u8)> = None;
        for (idx, b) in target.iter().enumerate() {
            if used[idx] {
                continue;
            }
            let score = local_semantic_score(a, b).score;
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((idx, score));
            }
        }

        if let Some((idx, score)) = best {
            if score >= PAIRING_THRESHOLD {
                used[idx] = true;
                pairs.push(InterestPair {
                    viewer: a.clone(),
                    target: target[idx].clone(),
                    score,
                });
            }
        }
    }

    pairs
}

/// Templated openers about the strongest overlap
///
/// Empty unless the score reaches [`STARTER_THRESHOLD`] and there is at least
/// one shared or related interest to talk about.
pub fn conversation_starters(
    score: f64,
    shared: &[String],
    related: &[RelatedInterest],
) -> Vec<String> {
    if score < STARTER_THRESHOLD {
        return Vec::new();
    }

    let Some(topic) = shared
        .first()
        .or_else(|| related.first().map(|r| &r.user_interest))
    else {
        return Vec::new();
    };

    vec![
        format!("Hey! I saw we both enjoy {topic} - what got you into it?"),
        format!("I noticed we have some similar interests! Have you been into {topic} for long?"),
        format!("We should definitely chat about {topic} sometime!"),
    ]
}

/// Round to one decimal and clamp to 0-100
#[inline]
pub fn normalize_score(raw: f64) -> f64 {
    if !raw.is_finite() {
        return 0.0;
    }
    ((raw * 10.0).round() / 10.0).clamp(0.0, 100.0)
}

/// Build an [`InterestMatch`] from scored interest pairs
///
/// Pairs at or above [`SHARED_THRESHOLD`] become shared interests (viewer's
/// spelling), pairs at or above [`RELATED_THRESHOLD`] become related ones and
/// weaker pairs are dropped. Starters are derived from the result.
pub fn assemble_match(score: f64, pairs: Vec<RelatedInterest>) -> InterestMatch {
    let score = normalize_score(score);
    let mut shared = Vec::new();
    let mut related = Vec::new();

    for pair in pairs {
        match pair.score {
            Some(s) if s >= SHARED_THRESHOLD => shared.push(pair.user_interest),
            Some(s) if s >= RELATED_THRESHOLD => related.push(pair),
            Some(_) => {}
            // Unscored pairs are kept as related
            None => related.push(pair),
        }
    }

    let shared = dedup_case_insensitive(shared);
    let conversation_starters = conversation_starters(score, &shared, &related);

    InterestMatch {
        score,
        shared_interests: shared,
        related_interests: related,
        conversation_starters,
    }
}

/// Re-express a match scored for the other member of the pair from `viewer`'s side
///
/// Related pairs are swapped, shared interests take the viewer's spelling when
/// the viewer lists them (case-insensitively) and starters are rebuilt.
pub fn orient_for_viewer(result: InterestMatch, viewer: &[String]) -> InterestMatch {
    let spelled_by_viewer = |interest: String| {
        let wanted = interest.trim().to_lowercase();
        viewer
            .iter()
            .map(|v| v.trim())
            .find(|v| v.to_lowercase() == wanted)
            .map_or(interest, str::to_string)
    };

    let shared = dedup_case_insensitive(
        result
            .shared_interests
            .into_iter()
            .map(spelled_by_viewer)
            .collect(),
    );
    let related: Vec<RelatedInterest> = result
        .related_interests
        .into_iter()
        .map(|r| RelatedInterest {
            user_interest: r.target_interest,
            target_interest: r.user_interest,
            relationship: r.relationship,
            score: r.score,
        })
        .collect();
    let conversation_starters = conversation_starters(result.score, &shared, &related);

    InterestMatch {
        score: result.score,
        shared_interests: shared,
        related_interests: related,
        conversation_starters,
    }
}
