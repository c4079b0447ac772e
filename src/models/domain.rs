use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Declares a preference enum that keeps unrecognised wire values instead of
/// rejecting them. Known values map to variants, anything else lands in
/// `Other` with the raw string so exact-match comparisons still work.
macro_rules! preference_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Other(raw) => raw.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $($wire => Self::$variant,)+
                    _ => Self::Other(value),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Ordinal preference scales, compared by position rather than equality.
pub trait Ordinal {
    /// Number of recognised positions on the scale
    const LEVELS: usize;

    /// Position on the scale, `None` for unrecognised values
    fn position(&self) -> Option<usize>;
}

macro_rules! ordinal_scale {
    ($name:ident [$($variant:ident),+ $(,)?]) => {
        impl Ordinal for $name {
            const LEVELS: usize = [$(stringify!($variant)),+].len();

            fn position(&self) -> Option<usize> {
                [$($name::$variant),+].iter().position(|level| level == self)
            }
        }
    };
}

preference_enum!(
    /// When a user tends to sleep
    SleepSchedule {
        EarlyRiser => "early-riser",
        NightOwl => "night-owl",
        Flexible => "flexible",
    }
);

preference_enum!(
    Cleanliness {
        VeryClean => "very-clean",
        ModeratelyClean => "moderately-clean",
        Relaxed => "relaxed",
    }
);

preference_enum!(
    SocialLevel {
        Quiet => "quiet",
        ModeratelySocial => "moderately-social",
        VerySocial => "very-social",
    }
);

preference_enum!(
    /// How often a user has guests over
    GuestFrequency {
        Rarely => "rarely",
        Sometimes => "sometimes",
        Often => "often",
    }
);

preference_enum!(
    Smoking {
        Smoker => "smoker",
        OutsideOnly => "outside-only",
        NonSmoker => "non-smoker",
    }
);

preference_enum!(
    Pets {
        HasPets => "has-pets",
        NoPets => "no-pets",
        Allergic => "allergic",
    }
);

preference_enum!(
    Gender {
        Male => "male",
        Female => "female",
        NonBinary => "non-binary",
        PreferNotToSay => "prefer-not-to-say",
    }
);

preference_enum!(
    /// Which gender a user wants to live with
    GenderPreference {
        Male => "male",
        Female => "female",
        NonBinary => "non-binary",
        NoPreference => "no-preference",
    }
);

ordinal_scale!(Cleanliness [VeryClean, ModeratelyClean, Relaxed]);
ordinal_scale!(SocialLevel [Quiet, ModeratelySocial, VerySocial]);
ordinal_scale!(GuestFrequency [Rarely, Sometimes, Often]);

impl GenderPreference {
    /// Whether a declared gender satisfies this preference
    pub fn accepts(&self, gender: &Gender) -> bool {
        match self {
            GenderPreference::NoPreference => true,
            preference => preference.as_str() == gender.as_str(),
        }
    }
}

/// Lifestyle preferences a user fills in for roommate matching.
///
/// Every field is optional. Missing keys, `null` and empty strings all
/// deserialize to `None`. Values of the wrong JSON type never fail the
/// record: enums keep their raw text in `Other` and times stay unparsable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoommatePreferences {
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub sleep_schedule: Option<SleepSchedule>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub bedtime: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub wake_time: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub cleanliness: Option<Cleanliness>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub social_level: Option<SocialLevel>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub guests: Option<GuestFrequency>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub smoking: Option<Smoking>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub pets: Option<Pets>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub gender_preference: Option<GenderPreference>,
}

impl RoommatePreferences {
    /// Parsed bedtime, `None` when missing or not `HH:MM`
    pub fn bedtime(&self) -> Option<NaiveTime> {
        self.bedtime.as_deref().and_then(parse_time_of_day)
    }

    /// Parsed wake time, `None` when missing or not `HH:MM`
    pub fn wake_time(&self) -> Option<NaiveTime> {
        self.wake_time.as_deref().and_then(parse_time_of_day)
    }

    /// True when at least one field carries a value
    pub fn is_filled(&self) -> bool {
        *self != Self::default()
    }
}

fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok()
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    // Any JSON value is accepted; non-strings keep their raw text
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    let text = match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    };
    Ok(text.filter(|s| !s.trim().is_empty()).map(T::from))
}

/// A user record as read from the user store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub school_id: Option<String>,
    /// Private until a match is computed; never echoed in responses
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub roommate_preferences: Option<RoommatePreferences>,
}

/// Two interests the scorer judged related
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedInterest {
    pub user_interest: String,
    pub target_interest: String,
    pub relationship: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Interest compatibility between two users, as produced by an interest scorer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestMatch {
    /// 0-100 with one decimal
    pub score: f64,
    #[serde(default)]
    pub shared_interests: Vec<String>,
    #[serde(default)]
    pub related_interests: Vec<RelatedInterest>,
    #[serde(default)]
    pub conversation_starters: Vec<String>,
}

impl InterestMatch {
    /// Result for a pair where one side has no usable interests
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Order-independent identity of a user pair.
///
/// Construction sorts the ids, so `(a, b)` and `(b, a)` are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairKey {
    low: String,
    high: String,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self { low: a.to_string(), high: b.to_string() }
        } else {
            Self { low: b.to_string(), high: a.to_string() }
        }
    }

    pub fn low(&self) -> &str {
        &self.low
    }

    pub fn high(&self) -> &str {
        &self.high
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.low == user_id || self.high == user_id
    }

    /// The member of the pair that is not `user_id`
    pub fn other(&self, user_id: &str) -> Option<&str> {
        if self.low == user_id {
            Some(&self.high)
        } else if self.high == user_id {
            Some(&self.low)
        } else {
            None
        }
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Normalized interests of both members at the time a match was cached
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedInterests {
    pub low: Vec<String>,
    pub high: Vec<String>,
}

/// Memoized interest match for a user pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCacheEntry {
    pub id: uuid::Uuid,
    pub pair: PairKey,
    /// Member whose lookup produced `result`; empty for entries written before it was tracked
    #[serde(default)]
    pub viewer_id: String,
    pub result: InterestMatch,
    #[serde(default)]
    pub normalized_interests: NormalizedInterests,
    pub hit_count: u64,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
}

impl MatchCacheEntry {
    pub fn new(
        pair: PairKey,
        viewer_id: &str,
        result: InterestMatch,
        normalized_interests: NormalizedInterests,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4(),
            pair,
            viewer_id: viewer_id.to_string(),
            result,
            normalized_interests,
            hit_count: 1,
            created_at: now,
            last_accessed_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_values_are_kept() {
        let prefs: RoommatePreferences = serde_json::from_str(
            r#"{"cleanliness":"spotless","pets":"allergic","smoking":null,"gender":""}"#,
        )
        .unwrap();

        assert_eq!(prefs.cleanliness, Some(Cleanliness::Other("spotless".to_string())));
        assert_eq!(prefs.pets, Some(Pets::Allergic));
        assert_eq!(prefs.smoking, None);
        assert_eq!(prefs.gender, None);
    }

    #[test]
    fn test_wrong_json_types_do_not_fail() {
        let prefs: RoommatePreferences = serde_json::from_str(
            r#"{"pets":3,"smoking":true,"cleanliness":{"level":1},"bedtime":2230,
                "sleepSchedule":"night-owl"}"#,
        )
        .unwrap();

        assert_eq!(prefs.pets, Some(Pets::Other("3".to_string())));
        assert_eq!(prefs.smoking, Some(Smoking::Other("true".to_string())));
        assert_eq!(prefs.cleanliness, Some(Cleanliness::Other(r#"{"level":1}"#.to_string())));
        assert_eq!(prefs.cleanliness.as_ref().and_then(Cleanliness::position), None);
        assert_eq!(prefs.bedtime(), None);
        assert_eq!(prefs.sleep_schedule, Some(SleepSchedule::NightOwl));
    }

    #[test]
    fn test_wire_names() {
        let prefs = RoommatePreferences {
            sleep_schedule: Some(SleepSchedule::NightOwl),
            gender_preference: Some(GenderPreference::NoPreference),
            ..Default::default()
        };

        let json = serde_json::to_value(&prefs).unwrap();
        assert_eq!(json["sleepSchedule"], "night-owl");
        assert_eq!(json["genderPreference"], "no-preference");
        assert!(json.get("pets").is_none());
    }

    #[test]
    fn test_ordinal_positions() {
        assert_eq!(Cleanliness::VeryClean.position(), Some(0));
        assert_eq!(Cleanliness::Relaxed.position(), Some(2));
        assert_eq!(SocialLevel::VerySocial.position(), Some(2));
        assert_eq!(GuestFrequency::Rarely.position(), Some(0));
        assert_eq!(Cleanliness::Other("tidy".into()).position(), None);
        assert_eq!(Cleanliness::LEVELS, 3);
    }

    #[test]
    fn test_time_parsing() {
        let prefs = RoommatePreferences {
            bedtime: Some("23:30".to_string()),
            wake_time: Some("late".to_string()),
            ..Default::default()
        };

        assert_eq!(prefs.bedtime(), NaiveTime::from_hms_opt(23, 30, 0));
        assert_eq!(prefs.wake_time(), None);
    }

    #[test]
    fn test_pair_key_is_order_independent() {
        let forward = PairKey::new("alice", "bob");
        let reverse = PairKey::new("bob", "alice");

        assert_eq!(forward, reverse);
        assert_eq!(forward.low(), "alice");
        assert_eq!(forward.other("bob"), Some("alice"));
        assert_eq!(forward.other("carol"), None);
        assert_eq!(forward.to_string(), "alice-bob");
    }

    #[test]
    fn test_gender_preference_accepts() {
        assert!(GenderPreference::NoPreference.accepts(&Gender::Male));
        assert!(GenderPreference::Female.accepts(&Gender::Female));
        assert!(!GenderPreference::Female.accepts(&Gender::Male));
    }
}
