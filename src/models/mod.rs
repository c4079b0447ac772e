// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Cleanliness, Gender, GenderPreference, GuestFrequency, InterestMatch, MatchCacheEntry,
    NormalizedInterests, Ordinal, PairKey, Pets, RelatedInterest, RoommatePreferences,
    SleepSchedule, Smoking, SocialLevel, User,
};
pub use requests::{CompatibilityRequest, MatchRequest, RecommendationsQuery};
pub use responses::{
    ClearCacheResponse, CompatibilityResponse, ErrorResponse, HealthResponse, MatchResponse,
    PairEvaluation, Recommendation, RecommendationsResponse,
};
