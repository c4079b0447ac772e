use crate::core::distance::{hour_difference, ordinal_match};
use crate::core::filters::pet_conflict;
use crate::models::{RoommatePreferences, SleepSchedule, Smoking};

/// Score returned when either side has no preference record
pub const NEUTRAL_LIFESTYLE_SCORE: u8 = 50;

/// Denominator used to rescale lifestyle points to 0-100
pub const LIFESTYLE_POINTS_SCALE: f64 = 135.0;

/// Share of the interest score in combined and secret scores
pub const INTEREST_WEIGHT: f64 = 0.6;

/// Share of the lifestyle score in combined and secret scores
pub const LIFESTYLE_WEIGHT: f64 = 0.4;

/// Full and neutral point allocations per lifestyle dimension
mod points {
    pub const GENDER: f64 = 25.0;
    pub const GENDER_NEUTRAL: f64 = 12.0;

    pub const SLEEP: f64 = 20.0;
    pub const SLEEP_FLEXIBLE: f64 = 15.0;
    pub const SLEEP_MISMATCH: f64 = 5.0;
    pub const SLEEP_NEUTRAL: f64 = 10.0;

    pub const SCHEDULE: f64 = 15.0;
    pub const SCHEDULE_WITHIN_2H: f64 = 10.0;
    pub const SCHEDULE_WITHIN_3H: f64 = 5.0;
    pub const SCHEDULE_NEUTRAL: f64 = 7.0;

    pub const CLEANLINESS: f64 = 15.0;
    pub const CLEANLINESS_NEUTRAL: f64 = 7.0;

    pub const SOCIAL: f64 = 10.0;
    pub const SOCIAL_NEUTRAL: f64 = 5.0;

    pub const GUESTS: f64 = 10.0;
    pub const GUESTS_NEUTRAL: f64 = 5.0;

    pub const SMOKING: f64 = 15.0;
    pub const SMOKING_OUTSIDE: f64 = 8.0;
    pub const SMOKING_NEUTRAL: f64 = 7.0;

    pub const PETS: f64 = 10.0;
    pub const PETS_PARTIAL: f64 = 5.0;
}

/// Calculate lifestyle compatibility (0-100) from two preference records
///
/// Each dimension contributes up to a fixed number of points and falls back to
/// a neutral partial credit when either side left it blank:
///
/// | dimension        | max | neutral |
/// |------------------|-----|---------|
/// | gender alignment | 25  | 12      |
/// | sleep schedule   | 20  | 10      |
/// | bedtime / wake   | 15  | 7       |
/// | cleanliness      | 15  | 7       |
/// | social level     | 10  | 5       |
/// | guests           | 10  | 5       |
/// | smoking          | 15  | 7       |
/// | pets             | 10  | 5       |
///
/// The total is rescaled with `round(total / 135 * 100)` and clamped. The
/// gender dimension only looks at A's preference against B's gender, so the
/// result is not symmetric in general.
pub fn calculate_roommate_compatibility(
    prefs_a: Option<&RoommatePreferences>,
    prefs_b: Option<&RoommatePreferences>,
) -> u8 {
    let (Some(a), Some(b)) = (prefs_a, prefs_b) else {
        return NEUTRAL_LIFESTYLE_SCORE;
    };

    let cleanliness = ordinal_points(
        a.cleanliness.as_ref(),
        b.cleanliness.as_ref(),
        points::CLEANLINESS,
        points::CLEANLINESS_NEUTRAL,
    );
    let social = ordinal_points(
        a.social_level.as_ref(),
        b.social_level.as_ref(),
        points::SOCIAL,
        points::SOCIAL_NEUTRAL,
    );
    let guests = ordinal_points(
        a.guests.as_ref(),
        b.guests.as_ref(),
        points::GUESTS,
        points::GUESTS_NEUTRAL,
    );

    let total = gender_points(a, b)
        + sleep_points(a, b)
        + schedule_points(a, b)
        + cleanliness
        + social
        + guests
        + smoking_points(a, b)
        + pet_points(a, b);

    let score = (total / LIFESTYLE_POINTS_SCALE * 100.0).round();
    score.clamp(0.0, 100.0) as u8
}

/// Combine an interest score with lifestyle compatibility
///
/// `round((interest * 0.6 + lifestyle * 0.4) * 10) / 10`, one decimal place.
/// The interest score is trusted as given.
pub fn calculate_combined_roommate_score(
    interest_score: f64,
    prefs_a: Option<&RoommatePreferences>,
    prefs_b: Option<&RoommatePreferences>,
) -> f64 {
    let lifestyle = calculate_roommate_compatibility(prefs_a, prefs_b);
    let combined = weighted(interest_score, lifestyle);
    (combined * 10.0).round() / 10.0
}

/// Integer ranking score used for recommendations
///
/// Same weights as the combined score, rounded to a whole number. Never shown
/// to users.
pub fn calculate_secret_score(interest_score: f64, lifestyle_score: u8) -> u8 {
    weighted(interest_score, lifestyle_score).round().clamp(0.0, 100.0) as u8
}

#[inline]
fn weighted(interest_score: f64, lifestyle_score: u8) -> f64 {
    interest_score * INTEREST_WEIGHT + f64::from(lifestyle_score) * LIFESTYLE_WEIGHT
}

fn gender_points(a: &RoommatePreferences, b: &RoommatePreferences) -> f64 {
    match (&a.gender_preference, &b.gender) {
        (Some(preference), Some(gender)) if preference.accepts(gender) => points::GENDER,
        (Some(_), Some(_)) => 0.0,
        _ => points::GENDER_NEUTRAL,
    }
}

fn sleep_points(a: &RoommatePreferences, b: &RoommatePreferences) -> f64 {
    match (&a.sleep_schedule, &b.sleep_schedule) {
        (Some(x), Some(y)) if x == y => points::SLEEP,
        (Some(SleepSchedule::Flexible), Some(_)) | (Some(_), Some(SleepSchedule::Flexible)) => {
            points::SLEEP_FLEXIBLE
        }
        (Some(_), Some(_)) => points::SLEEP_MISMATCH,
        _ => points::SLEEP_NEUTRAL,
    }
}

fn schedule_points(a: &RoommatePreferences, b: &RoommatePreferences) -> f64 {
    let (Some(bed_a), Some(bed_b), Some(wake_a), Some(wake_b)) =
        (a.bedtime(), b.bedtime(), a.wake_time(), b.wake_time())
    else {
        return points::SCHEDULE_NEUTRAL;
    };

    let avg_diff = (hour_difference(bed_a, bed_b) + hour_difference(wake_a, wake_b)) / 2.0;

    if avg_diff < 1.0 {
        points::SCHEDULE
    } else if avg_diff < 2.0 {
        points::SCHEDULE_WITHIN_2H
    } else if avg_diff < 3.0 {
        points::SCHEDULE_WITHIN_3H
    } else {
        0.0
    }
}

fn ordinal_points<T: crate::models::Ordinal>(
    a: Option<&T>,
    b: Option<&T>,
    max: f64,
    neutral: f64,
) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => ordinal_match(a, b) * max,
        _ => neutral,
    }
}

fn smoking_points(a: &RoommatePreferences, b: &RoommatePreferences) -> f64 {
    match (&a.smoking, &b.smoking) {
        (Some(x), Some(y)) if x == y => points::SMOKING,
        (Some(Smoking::OutsideOnly), Some(_)) | (Some(_), Some(Smoking::OutsideOnly)) => {
            points::SMOKING_OUTSIDE
        }
        // Smoker against non-smoker, or unrecognised values that disagree
        (Some(_), Some(_)) => 0.0,
        _ => points::SMOKING_NEUTRAL,
    }
}

fn pet_points(a: &RoommatePreferences, b: &RoommatePreferences) -> f64 {
    match (&a.pets, &b.pets) {
        (Some(x), Some(y)) if x == y => points::PETS,
        (Some(_), Some(_)) if pet_conflict(a.pets.as_ref(), b.pets.as_ref()) => 0.0,
        _ => points::PETS_PARTIAL,
    }
}
