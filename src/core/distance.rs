use crate::models::Ordinal;
use chrono::NaiveTime;

/// Match factor used when either value is not on the ordinal scale
const OFF_SCALE_FACTOR: f64 = 0.5;

/// How closely two values on an ordinal scale agree
///
/// Returns `1 - |a - b| / (levels - 1)`, so identical values give 1.0 and the
/// two extremes of the scale give 0.0. Values that are not on the scale get
/// a flat 0.5 instead of failing.
#[inline]
pub fn ordinal_match<T: Ordinal>(a: &T, b: &T) -> f64 {
    let (Some(index_a), Some(index_b)) = (a.position(), b.position()) else {
        return OFF_SCALE_FACTOR;
    };

    let max_diff = T::LEVELS.saturating_sub(1);
    if max_diff == 0 {
        return 1.0;
    }

    1.0 - index_a.abs_diff(index_b) as f64 / max_diff as f64
}

/// Absolute difference between two times of day, in hours
///
/// Times are compared on a single day: 23:00 and 01:00 are 22 hours apart.
#[inline]
pub fn hour_difference(a: NaiveTime, b: NaiveTime) -> f64 {
    (a - b).num_minutes().abs() as f64 / 60.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cleanliness, GuestFrequency, SocialLevel};

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_ordinal_match_extremes() {
        assert_eq!(ordinal_match(&Cleanliness::VeryClean, &Cleanliness::VeryClean), 1.0);
        assert_eq!(ordinal_match(&Cleanliness::VeryClean, &Cleanliness::ModeratelyClean), 0.5);
        assert_eq!(ordinal_match(&Cleanliness::VeryClean, &Cleanliness::Relaxed), 0.0);
    }

    #[test]
    fn test_ordinal_match_off_scale() {
        let unknown = SocialLevel::Other("party-animal".to_string());
        assert_eq!(ordinal_match(&unknown, &SocialLevel::Quiet), 0.5);
        assert_eq!(ordinal_match(&unknown, &unknown), 0.5);
    }

    #[test]
    fn test_ordinal_match_is_symmetric() {
        let a = GuestFrequency::Rarely;
        let b = GuestFrequency::Sometimes;
        assert_eq!(ordinal_match(&a, &b), ordinal_match(&b, &a));
    }

    #[test]
    fn test_hour_difference() {
        assert_eq!(hour_difference(time(23, 0), time(23, 30)), 0.5);
        assert_eq!(hour_difference(time(7, 0), time(9, 0)), 2.0);
        assert_eq!(hour_difference(time(23, 0), time(1, 0)), 22.0);
    }
}
