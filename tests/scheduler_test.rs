//! Scheduler integration tests: rotation fairness, delay and the offset counter

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use common::repositories;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rankwatch::config::RankConfig;
use rankwatch::scheduler::{DelayEstimator, OffsetCounter, PhraseRotation};
use rankwatch::storage::{RankRepository, SqliteRankRepository};

fn phrases(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("phrase {i:03}")).collect()
}

#[test]
fn test_rotation_covers_universe_before_repeating() {
    for (backend, repo) in repositories() {
        let all = phrases(20);
        repo.replace_phrases(&all).unwrap();

        let rotation = PhraseRotation::new(repo.clone());
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut seen = HashSet::new();
        let base = Utc::now();

        // Simulate contributors parsing every phrase they are handed
        for round in 0..4 {
            let batch = rotation.rotate(5, &mut rng).unwrap();
            assert_eq!(batch.len(), 5, "{backend}");
            for name in &batch {
                assert!(seen.insert(name.clone()), "{backend}: {name} handed out twice");
                repo.mark_phrase_parsed(name, base + Duration::seconds(round))
                    .unwrap();
            }
        }

        assert_eq!(seen.len(), 20, "{backend}");
        assert!(repo.never_parsed_phrases().unwrap().is_empty(), "{backend}");
    }
}

#[test]
fn test_rotation_prefers_stalest_phrases() {
    for (backend, repo) in repositories() {
        let all = phrases(50);
        repo.replace_phrases(&all).unwrap();
        let base = Utc::now() - Duration::days(2);
        for (i, name) in all.iter().enumerate() {
            repo.mark_phrase_parsed(name, base + Duration::minutes(i as i64))
                .unwrap();
        }

        // 3 requested with a pool factor of 5: only the 15 oldest are eligible
        let eligible: HashSet<String> = all[..15].iter().cloned().collect();
        let rotation = PhraseRotation::new(repo.clone());
        for seed in 0..25 {
            let batch = rotation
                .rotate(3, &mut ChaCha8Rng::seed_from_u64(seed))
                .unwrap();
            assert_eq!(batch.len(), 3, "{backend}");
            assert!(batch.iter().all(|p| eligible.contains(p)), "{backend}: {batch:?}");
        }
    }
}

#[test]
fn test_scheduling_does_not_mark_phrases_parsed() {
    for (backend, repo) in repositories() {
        repo.replace_phrases(&phrases(3)).unwrap();
        let rotation = PhraseRotation::new(repo.clone());

        rotation
            .rotate(3, &mut ChaCha8Rng::seed_from_u64(1))
            .unwrap();
        assert_eq!(repo.never_parsed_phrases().unwrap().len(), 3, "{backend}");
    }
}

#[test]
fn test_delay_scales_with_active_contributors() {
    for (backend, repo) in repositories() {
        repo.replace_phrases(&phrases(100)).unwrap();
        let config = RankConfig::default();
        let estimator = DelayEstimator::new(repo.clone(), &config);
        let now = Utc::now();

        for i in 0..10 {
            repo.record_activity(&format!("10.0.1.{i}"), now - Duration::minutes(10))
                .unwrap();
        }
        // Outside the one hour window
        repo.record_activity("10.0.2.1", now - Duration::hours(2))
            .unwrap();

        // 2700 × 10 × 5 / 100
        let delay = estimator.estimate(5, "10.0.1.0", now).unwrap();
        assert_eq!(delay, StdDuration::from_secs(1350), "{backend}");
    }
}

#[test]
fn test_delay_floor_with_no_phrases() {
    for (backend, repo) in repositories() {
        let estimator = DelayEstimator::new(repo.clone(), &RankConfig::default());
        let delay = estimator.estimate(5, "10.0.0.1", Utc::now()).unwrap();
        assert_eq!(delay, StdDuration::from_secs(600), "{backend}");
    }
}

#[test]
fn test_offset_counter_concurrent_increments_file_backed() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Arc::new(SqliteRankRepository::new(dir.path().join("rank.db")).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let counter = OffsetCounter::new(repo.clone(), "phrases");
            std::thread::spawn(move || {
                (0..50)
                    .map(|_| counter.increment(1).unwrap())
                    .collect::<Vec<i64>>()
            })
        })
        .collect();

    let mut previous: Vec<i64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    previous.sort_unstable();

    assert_eq!(previous, (0..200).collect::<Vec<i64>>());
    assert_eq!(OffsetCounter::new(repo, "phrases").value().unwrap(), 200);
}
