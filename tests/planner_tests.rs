//! Planner integration tests
//!
//! Regeneration, locking, persistence failure and scouting sections driven
//! through the public planner API.

use std::time::Duration;

use gameplan::engine::{SectionGroupSpec, SectionSpec, SituationFlags};
use gameplan::{
    Distribution, DistributionKind, GamePlanError, GamePlanStore, MemoryStore, Notice, Play,
    PlayCategory, Planner, PlannerConfig, SectionKey, SectionKind, Situation,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn pool() -> Vec<Play> {
    let red_zone = SituationFlags {
        red_zone: true,
        ..Default::default()
    };
    vec![
        Play::new("inside-zone", PlayCategory::RunGame, "Inside Zone").with_front_beaters("Over"),
        Play::new("duo", PlayCategory::RunGame, "Duo").with_front_beaters("Over, Under"),
        Play::new("power", PlayCategory::RunGame, "Power").with_front_beaters("Under"),
        Play::new("glance", PlayCategory::Rpo, "Glance").with_front_beaters("Over"),
        Play::new("stick", PlayCategory::QuickGame, "Stick").with_coverage_beaters("Cover 3"),
        Play::new("slant-flat", PlayCategory::QuickGame, "Slant Flat").with_coverage_beaters("Cover 2"),
        Play::new("mesh", PlayCategory::Dropback, "Mesh").with_coverage_beaters("Cover 1"),
        Play::new("dagger", PlayCategory::Dropback, "Dagger").with_coverage_beaters("Cover 3"),
        Play::new("bubble", PlayCategory::Screen, "Bubble"),
        Play::new("post-wheel", PlayCategory::ShotPlay, "Post Wheel").with_protection("PA 7"),
        Play::new("fade", PlayCategory::ShotPlay, "Fade").with_situations(red_zone.clone()),
        Play::new("snag", PlayCategory::QuickGame, "Snag").with_situations(red_zone),
    ]
}

fn config(sections: Vec<SectionSpec>) -> PlannerConfig {
    PlannerConfig {
        team_id: "hawks".into(),
        opponent_id: "owls".into(),
        groups: vec![SectionGroupSpec {
            name: "main".into(),
            sections,
        }],
        category_mix: Default::default(),
        ..Default::default()
    }
}

fn filled_ids(plan: &gameplan::GamePlan, key: &str) -> Vec<Option<String>> {
    plan.section(key)
        .unwrap()
        .slots
        .iter()
        .map(|s| s.play.as_ref().map(|p| p.id.clone()))
        .collect()
}

// =============================================================================
// Regeneration and Locks
// =============================================================================

mod lock_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_locked_slots_survive_every_regeneration() {
        let store = MemoryStore::new(pool());
        let planner = Planner::new(
            &store,
            &store,
            &store,
            config(vec![SectionSpec::new("opening", "Opening", SectionKind::General, 6)]),
        );
        let mut plan = planner.open().await.unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        planner
            .regenerate_section(&mut plan, "opening", &mut rng)
            .await
            .unwrap();
        let mut section = plan.section("opening").unwrap().clone();
        section.toggle_lock(0).unwrap();
        section.toggle_lock(2).unwrap();
        planner.commit_section(&mut plan, section).await.unwrap();
        let before = filled_ids(&plan, "opening");

        for _ in 0..10 {
            let report = planner
                .regenerate_section(&mut plan, "opening", &mut rng)
                .await
                .unwrap();
            assert_eq!(report.filled, 6);
            let after = filled_ids(&plan, "opening");
            assert_eq!(after[0], before[0]);
            assert_eq!(after[2], before[2]);
            let positions: Vec<usize> = plan
                .section("opening")
                .unwrap()
                .slots
                .iter()
                .map(|s| s.position)
                .collect();
            assert_eq!(positions, (0..6).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn test_locks_are_restored_on_open() {
        let store = MemoryStore::new(pool());
        let planner = Planner::new(
            &store,
            &store,
            &store,
            config(vec![SectionSpec::new("opening", "Opening", SectionKind::General, 4)]),
        );
        let mut plan = planner.open().await.unwrap();
        planner
            .regenerate_section(&mut plan, "opening", &mut StdRng::seed_from_u64(5))
            .await
            .unwrap();
        let mut section = plan.section("opening").unwrap().clone();
        section.toggle_lock(1).unwrap();
        section.toggle_favorite(3).unwrap();
        planner.commit_section(&mut plan, section).await.unwrap();

        let reopened = planner.open().await.unwrap();
        let opening = reopened.section("opening").unwrap();
        assert!(opening.slots[1].locked);
        assert!(opening.slots[3].favorite);
        assert_eq!(filled_ids(&reopened, "opening"), filled_ids(&plan, "opening"));
    }
}

// =============================================================================
// Collaborator Failures
// =============================================================================

mod failure_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_persistence_failure_keeps_previous_plan() {
        let store = MemoryStore::new(pool());
        let planner = Planner::new(
            &store,
            &store,
            &store,
            config(vec![SectionSpec::new("opening", "Opening", SectionKind::General, 5)]),
        );
        let mut plan = planner.open().await.unwrap();
        planner
            .regenerate_section(&mut plan, "opening", &mut StdRng::seed_from_u64(1))
            .await
            .unwrap();
        let stable = plan.clone();
        let stored = store.records();

        store.fail_section("opening");
        let err = planner
            .regenerate_section(&mut plan, "opening", &mut StdRng::seed_from_u64(2))
            .await
            .unwrap_err();
        assert!(matches!(err, GamePlanError::Persistence { .. }));
        assert_eq!(plan, stable);
        assert_eq!(store.records(), stored);

        store.heal();
        planner
            .regenerate_section(&mut plan, "opening", &mut StdRng::seed_from_u64(2))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_regenerate_all_reports_every_failure() {
        let store = MemoryStore::new(pool());
        store.fail_section("a");
        store.fail_section("c");
        let planner = Planner::new(
            &store,
            &store,
            &store,
            config(vec![
                SectionSpec::new("a", "A", SectionKind::General, 2),
                SectionSpec::new("b", "B", SectionKind::General, 2),
                SectionSpec::new("c", "C", SectionKind::General, 2),
            ]),
        );
        let mut plan = planner.open().await.unwrap();
        let summary = planner
            .regenerate_all(&mut plan, &mut StdRng::seed_from_u64(9), |_, _| {})
            .await
            .unwrap();

        let failed: Vec<String> = summary.failures.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(failed, vec!["a", "c"]);
        assert_eq!(summary.reports.len(), 1);
        assert_eq!(plan.section("b").unwrap().filled_count(), 2);
    }

    #[tokio::test]
    async fn test_slow_store_is_a_timeout() {
        let store = MemoryStore::new(pool()).with_latency(Duration::from_millis(250));
        let mut config = config(vec![SectionSpec::new("a", "A", SectionKind::General, 2)]);
        config.timeout_ms = 25;
        let planner = Planner::new(&store, &store, &store, config);
        match planner.open().await {
            Err(GamePlanError::Timeout { operation, .. }) => {
                assert_eq!(operation, "fetch play pool")
            }
            other => panic!("expected timeout, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_invalid_configuration_rejected_before_allocation() {
        let store = MemoryStore::new(pool());
        let planner = Planner::new(
            &store,
            &store,
            &store,
            config(vec![SectionSpec::new("combo", "Combo", SectionKind::Combo, 3)]),
        );
        assert!(planner.open().await.unwrap_err().is_configuration());
        assert!(store.records().is_empty());
    }
}

// =============================================================================
// Scouting Sections
// =============================================================================

mod scouting_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scouted_store() -> MemoryStore {
        MemoryStore::new(pool())
            .with_distribution(
                DistributionKind::Front,
                Distribution::new().with("Bear", 30.0).with("Over", 50.0).with("Under", 20.0),
            )
            .with_distribution(
                DistributionKind::Coverage,
                Distribution::new().with("Cover 3", 70.0).with("Cover 0", 0.0),
            )
    }

    #[tokio::test]
    async fn test_open_creates_beater_sections() {
        let store = scouted_store();
        let planner = Planner::new(&store, &store, &store, config(Vec::new()));
        let plan = planner.open().await.unwrap();

        let keys: Vec<String> = plan.ordered_keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(
            keys,
            vec!["front:bear", "front:over", "front:under", "coverage:cover-3"]
        );
    }

    #[tokio::test]
    async fn test_bear_without_beaters_is_a_notice() {
        let store = scouted_store();
        let planner = Planner::new(&store, &store, &store, config(Vec::new()));
        let mut plan = planner.open().await.unwrap();

        let report = planner
            .regenerate_section(&mut plan, "front:bear", &mut StdRng::seed_from_u64(0))
            .await
            .unwrap();
        assert_eq!(report.filled, 0);
        assert_eq!(
            report.notices,
            vec![Notice::NoCandidates {
                section: "front:bear".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_over_beaters_are_run_or_rpo() {
        let store = scouted_store();
        let planner = Planner::new(&store, &store, &store, config(Vec::new()));
        let mut plan = planner.open().await.unwrap();
        planner
            .regenerate_section(&mut plan, "front:over", &mut StdRng::seed_from_u64(4))
            .await
            .unwrap();

        let mut ids: Vec<String> = filled_ids(&plan, "front:over").into_iter().flatten().collect();
        ids.sort();
        assert_eq!(ids, vec!["duo", "glance", "inside-zone"]);
    }

    #[tokio::test]
    async fn test_run_mix_follows_front_weights() {
        let store = scouted_store();
        let planner = Planner::new(
            &store,
            &store,
            &store,
            config(vec![SectionSpec::new("runs", "Runs", SectionKind::FrontMix, 4)]),
        );
        let mut plan = planner.open().await.unwrap();
        let report = planner
            .regenerate_section(&mut plan, "runs", &mut StdRng::seed_from_u64(8))
            .await
            .unwrap();

        // Over and Under beaters cover four plays, so Bear's slot is backfilled
        assert_eq!(report.filled, 4);
        assert!(report
            .notices
            .iter()
            .any(|n| matches!(n, Notice::BucketShortfall { bucket, .. } if bucket == "Bear")));
    }
}

// =============================================================================
// Section Policies Through the Planner
// =============================================================================

mod policy_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_situational_and_play_action_sections() {
        let store = MemoryStore::new(pool());
        let planner = Planner::new(
            &store,
            &store,
            &store,
            config(vec![
                SectionSpec::new(
                    "red-zone",
                    "Red Zone",
                    SectionKind::Situational {
                        situation: Situation::RedZone,
                    },
                    4,
                ),
                SectionSpec::new("play-action", "Play Action", SectionKind::PlayAction, 4),
            ]),
        );
        let mut plan = planner.open().await.unwrap();
        let summary = planner
            .regenerate_all(&mut plan, &mut StdRng::seed_from_u64(2), |_, _| {})
            .await
            .unwrap();
        assert!(summary.is_success());

        let mut red_zone: Vec<String> = filled_ids(&plan, "red-zone").into_iter().flatten().collect();
        red_zone.sort();
        assert_eq!(red_zone, vec!["fade", "snag"]);

        let mut shots: Vec<String> = filled_ids(&plan, "play-action").into_iter().flatten().collect();
        shots.sort();
        assert_eq!(shots, vec!["fade", "post-wheel"]);
    }

    #[tokio::test]
    async fn test_combo_pairs_mix_categories() {
        let store = MemoryStore::new(pool());
        let planner = Planner::new(
            &store,
            &store,
            &store,
            config(vec![SectionSpec::new("combos", "Combos", SectionKind::Combo, 4)]),
        );
        let mut plan = planner.open().await.unwrap();
        for seed in 0..10 {
            planner
                .regenerate_section(&mut plan, "combos", &mut StdRng::seed_from_u64(seed))
                .await
                .unwrap();
            let combos = plan.section("combos").unwrap();
            for pair in combos.slots.chunks(2) {
                let first = pair[0].play.as_ref().unwrap();
                let second = pair[1].play.as_ref().unwrap();
                assert_ne!(first.category, second.category);
            }
        }
    }

    #[tokio::test]
    async fn test_numbering_skips_hidden_sections() {
        let store = MemoryStore::new(pool());
        let planner = Planner::new(
            &store,
            &store,
            &store,
            config(vec![
                SectionSpec::new("a", "A", SectionKind::General, 3),
                SectionSpec::new("b", "B", SectionKind::General, 2),
                SectionSpec::new("c", "C", SectionKind::General, 2),
            ]),
        );
        let mut plan = planner.open().await.unwrap();
        planner
            .regenerate_all(&mut plan, &mut StdRng::seed_from_u64(6), |_, _| {})
            .await
            .unwrap();
        plan.set_visibility("b", false).unwrap();

        let numbering = plan.numbering();
        assert_eq!(numbering.get(&SectionKey::new("a")), Some(&1));
        assert_eq!(numbering.get(&SectionKey::new("b")), None);
        assert_eq!(numbering.get(&SectionKey::new("c")), Some(&4));

        let numbers: Vec<usize> = plan.script().iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_delete_all_clears_store_and_locks() {
        let store = MemoryStore::new(pool());
        let planner = Planner::new(
            &store,
            &store,
            &store,
            config(vec![SectionSpec::new("a", "A", SectionKind::General, 3)]),
        );
        let mut plan = planner.open().await.unwrap();
        planner
            .regenerate_section(&mut plan, "a", &mut StdRng::seed_from_u64(3))
            .await
            .unwrap();
        let mut section = plan.section("a").unwrap().clone();
        section.toggle_lock(0).unwrap();
        planner.commit_section(&mut plan, section).await.unwrap();

        planner.delete_all(&mut plan).await.unwrap();
        let a = plan.section("a").unwrap();
        assert_eq!(a.filled_count(), 0);
        assert!(a.slots.iter().all(|s| !s.locked));
        assert!(store.load_records("hawks", "owls").await.unwrap().is_empty());
    }
}
