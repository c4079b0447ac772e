// Criterion benchmarks for Shatter the Ice

use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use shatter_ice::core::{
    calculate_roommate_compatibility, pair_interests, passes_hard_filters, Matcher,
};
use shatter_ice::models::{
    Cleanliness, Gender, GenderPreference, GuestFrequency, Pets, RoommatePreferences,
    SleepSchedule, Smoking, SocialLevel, User,
};
use std::collections::HashMap;

fn create_preferences(id: usize) -> RoommatePreferences {
    let sleeps = [SleepSchedule::EarlyRiser, SleepSchedule::NightOwl, SleepSchedule::Flexible];
    let cleanliness = [Cleanliness::VeryClean, Cleanliness::ModeratelyClean, Cleanliness::Relaxed];
    let social = [SocialLevel::Quiet, SocialLevel::ModeratelySocial, SocialLevel::VerySocial];
    let guests = [GuestFrequency::Rarely, GuestFrequency::Sometimes, GuestFrequency::Often];
    let smoking = [Smoking::NonSmoker, Smoking::OutsideOnly, Smoking::Smoker];
    let pets = [Pets::NoPets, Pets::HasPets, Pets::Allergic];

    RoommatePreferences {
        sleep_schedule: Some(sleeps[id % 3].clone()),
        bedtime: Some(format!("{:02}:{:02}", 21 + id % 3, (id * 15) % 60)),
        wake_time: Some(format!("{:02}:00", 6 + id % 4)),
        cleanliness: Some(cleanliness[(id / 3) % 3].clone()),
        social_level: Some(social[(id / 2) % 3].clone()),
        guests: Some(guests[(id / 5) % 3].clone()),
        smoking: Some(smoking[(id / 7) % 3].clone()),
        pets: Some(pets[(id / 11) % 3].clone()),
        gender: Some(if id % 2 == 0 { Gender::Female } else { Gender::Male }),
        gender_preference: Some(if id % 4 == 0 {
            GenderPreference::Female
        } else {
            GenderPreference::NoPreference
        }),
    }
}

fn create_candidate(id: usize) -> User {
    User {
        id: format!("user-{:05}", id),
        name: format!("User {}", id),
        school_id: Some("ucla".to_string()),
        interests: vec!["chess".to_string(), "anime".to_string()],
        roommate_preferences: if id % 10 == 0 { None } else { Some(create_preferences(id)) },
    }
}

fn bench_roommate_compatibility(c: &mut Criterion) {
    let a = create_preferences(1);
    let b = create_preferences(2);

    c.bench_function("roommate_compatibility", |bench| {
        bench.iter(|| calculate_roommate_compatibility(black_box(Some(&a)), black_box(Some(&b))));
    });
}

fn bench_hard_filters(c: &mut Criterion) {
    let a = create_preferences(4);
    let b = create_preferences(5);

    c.bench_function("hard_filters", |bench| {
        bench.iter(|| passes_hard_filters(black_box(Some(&a)), black_box(Some(&b))));
    });
}

fn bench_interest_pairing(c: &mut Criterion) {
    let viewer: Vec<String> = [
        "Chess",
        "anime",
        "rock climbing",
        "hackathons",
        "robotics",
        "baking",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let target: Vec<String> = ["chess", "cosplay", "climbing", "coding", "engineering", "surfing"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    c.bench_function("interest_pairing_6x6", |bench| {
        bench.iter(|| pair_interests(black_box(&viewer), black_box(&target)));
    });
}

fn bench_ranking(c: &mut Criterion) {
    let matcher = Matcher::default();
    let user = User {
        id: "viewer".to_string(),
        name: "Viewer".to_string(),
        school_id: Some("ucla".to_string()),
        interests: vec!["chess".to_string()],
        roommate_preferences: Some(create_preferences(3)),
    };

    let mut group = c.benchmark_group("ranking");

    for candidate_count in [10, 50, 100, 500, 1000].iter() {
        let candidates: Vec<User> = (0..*candidate_count).map(create_candidate).collect();
        let cached_scores: HashMap<String, f64> = candidates
            .iter()
            .step_by(3)
            .map(|c| (c.id.clone(), 40.0 + (c.id.len() % 50) as f64))
            .collect();

        group.bench_with_input(
            BenchmarkId::new("rank", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    matcher.rank(
                        black_box(&user),
                        black_box(candidates.clone()),
                        black_box(&cached_scores),
                        black_box(20),
                    )
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_roommate_compatibility,
    bench_hard_filters,
    bench_interest_pairing,
    bench_ranking
);

criterion_main!(benches);
