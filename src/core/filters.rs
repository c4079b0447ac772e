use crate::models::{Gender, GenderPreference, Pets, RoommatePreferences};

/// Check whether two users can be roommates at all
///
/// These are the non-negotiable filters, applied before any scoring:
/// - gender preference, in both directions
/// - pet allergies, in both directions
///
/// A missing preference record on either side fails the gate. A missing
/// gender on the other side does not: an incomplete profile passes the
/// gender rule.
#[inline]
pub fn passes_hard_filters(
    prefs_a: Option<&RoommatePreferences>,
    prefs_b: Option<&RoommatePreferences>,
) -> bool {
    let (Some(a), Some(b)) = (prefs_a, prefs_b) else {
        return false;
    };

    if !gender_rule(a.gender_preference.as_ref(), b.gender.as_ref())
        || !gender_rule(b.gender_preference.as_ref(), a.gender.as_ref())
    {
        return false;
    }

    !pet_conflict(a.pets.as_ref(), b.pets.as_ref())
}

fn gender_rule(preference: Option<&GenderPreference>, gender: Option<&Gender>) -> bool {
    match (preference, gender) {
        (Some(preference), Some(gender)) => preference.accepts(gender),
        _ => true,
    }
}

/// True when one side is allergic and the other has pets
#[inline]
pub fn pet_conflict(a: Option<&Pets>, b: Option<&Pets>) -> bool {
    matches!(
        (a, b),
        (Some(Pets::Allergic), Some(Pets::HasPets)) | (Some(Pets::HasPets), Some(Pets::Allergic))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> RoommatePreferences {
        RoommatePreferences::default()
    }

    #[test]
    fn test_missing_record_fails() {
        assert!(!passes_hard_filters(None, Some(&prefs())));
        assert!(!passes_hard_filters(Some(&prefs()), None));
        assert!(!passes_hard_filters(None, None));
    }

    #[test]
    fn test_empty_records_pass() {
        assert!(passes_hard_filters(Some(&prefs()), Some(&prefs())));
    }

    #[test]
    fn test_gender_preference_mismatch() {
        let a = RoommatePreferences {
            gender_preference: Some(GenderPreference::Female),
            ..prefs()
        };
        let b = RoommatePreferences {
            gender: Some(Gender::Male),
            ..prefs()
        };

        assert!(!passes_hard_filters(Some(&a), Some(&b)));
        // The rule holds whichever side asks
        assert!(!passes_hard_filters(Some(&b), Some(&a)));
    }

    #[test]
    fn test_no_preference_passes() {
        let a = RoommatePreferences {
            gender_preference: Some(GenderPreference::NoPreference),
            ..prefs()
        };
        let b = RoommatePreferences {
            gender: Some(Gender::Male),
            ..prefs()
        };

        assert!(passes_hard_filters(Some(&a), Some(&b)));
    }

    #[test]
    fn test_undeclared_gender_is_permissive() {
        let a = RoommatePreferences {
            gender_preference: Some(GenderPreference::Female),
            ..prefs()
        };

        // Target never filled in a gender: the rule is skipped, not failed
        assert!(passes_hard_filters(Some(&a), Some(&prefs())));
    }

    #[test]
    fn test_pet_allergy() {
        let allergic = RoommatePreferences {
            pets: Some(Pets::Allergic),
            ..prefs()
        };
        let has_pets = RoommatePreferences {
            pets: Some(Pets::HasPets),
            ..prefs()
        };
        let no_pets = RoommatePreferences {
            pets: Some(Pets::NoPets),
            ..prefs()
        };

        assert!(!passes_hard_filters(Some(&allergic), Some(&has_pets)));
        assert!(!passes_hard_filters(Some(&has_pets), Some(&allergic)));
        assert!(passes_hard_filters(Some(&allergic), Some(&no_pets)));
        assert!(passes_hard_filters(Some(&allergic), Some(&allergic)));
    }
}
