//! @acp:module "Store"
//! @acp:summary "Collaborator interfaces for the play pool, scouting and game plan persistence"
//! @acp:domain store
//! @acp:layer service
//!
//! The engine treats every collaborator as slow and fallible. Implementations
//! here are a JSON directory ([`FileStore`]) and an in-process store with
//! failure injection ([`MemoryStore`]).

pub mod file;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::engine::{
    Distribution, DistributionKind, GamePlan, Play, PlayCategory, Section, SectionKey,
};
use crate::error::Result;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Supplies the team's play pool
pub trait PlayPoolSource {
    fn fetch_play_pool(&self) -> impl Future<Output = Result<Vec<Play>>> + Send;
}

/// Supplies scouting percentages per front or coverage
pub trait DistributionSource {
    fn fetch_distribution(
        &self,
        kind: DistributionKind,
    ) -> impl Future<Output = Result<Distribution>> + Send;
}

/// Persists the section -> slot mapping of a game plan
pub trait GamePlanStore {
    /// Replace every stored record of `section` with `records`
    fn persist_section(
        &self,
        team_id: &str,
        opponent_id: &str,
        section: &SectionKey,
        records: &[SlotRecord],
    ) -> impl Future<Output = Result<()>> + Send;

    fn load_records(
        &self,
        team_id: &str,
        opponent_id: &str,
    ) -> impl Future<Output = Result<Vec<SlotRecord>>> + Send;

    fn delete_all(&self, team_id: &str, opponent_id: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Persisted form of one occupied slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotRecord {
    pub team_id: String,
    pub opponent_id: String,
    pub play_id: String,
    /// Lower-case section key
    pub section: String,
    pub position: usize,
    pub call_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customized_edit: Option<String>,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub category: Option<PlayCategory>,
    pub updated_at: DateTime<Utc>,
}

impl SlotRecord {
    pub fn belongs_to(&self, team_id: &str, opponent_id: &str) -> bool {
        self.team_id == team_id && self.opponent_id == opponent_id
    }
}

/// Records for the occupied slots of one section
pub fn section_records(team_id: &str, opponent_id: &str, section: &Section) -> Vec<SlotRecord> {
    let now = Utc::now();
    section
        .slots
        .iter()
        .filter_map(|slot| {
            let play = slot.play.as_ref()?;
            Some(SlotRecord {
                team_id: team_id.to_string(),
                opponent_id: opponent_id.to_string(),
                play_id: play.id.clone(),
                section: section.key.as_str().to_lowercase(),
                position: slot.position,
                call_text: play.call_text(),
                customized_edit: slot.custom_text.clone(),
                is_locked: slot.locked,
                is_favorite: slot.favorite,
                category: play.category,
                updated_at: now,
            })
        })
        .collect()
}

/// Fill `plan` from stored records, resolving plays against `pool`.
///
/// Records for unknown sections, unknown plays or out-of-range positions are
/// skipped with a warning. Returns the number of records applied.
pub fn apply_records(plan: &mut GamePlan, records: &[SlotRecord], pool: &[Play]) -> usize {
    let (team_id, opponent_id) = (plan.team_id.clone(), plan.opponent_id.clone());
    let mut applied = 0;
    for record in records.iter().filter(|r| r.belongs_to(&team_id, &opponent_id)) {
        let Ok(section) = plan.section_mut(&record.section.to_lowercase()) else {
            tracing::warn!("Skipping record for unknown section: {}", record.section);
            continue;
        };
        let Some(play) = pool.iter().find(|p| p.id == record.play_id) else {
            tracing::warn!(
                "Skipping record for play missing from the pool: {}",
                record.play_id
            );
            continue;
        };
        let Some(slot) = section.slots.get_mut(record.position) else {
            tracing::warn!(
                "Skipping record at position {} beyond capacity of {}",
                record.position,
                record.section
            );
            continue;
        };
        slot.play = Some(play.clone());
        slot.locked = record.is_locked;
        slot.favorite = record.is_favorite;
        slot.custom_text = record.customized_edit.clone();
        applied += 1;
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{SectionGroupSpec, SectionKind, SectionSpec};

    fn plan() -> GamePlan {
        GamePlan::new(
            "team",
            "opp",
            &[SectionGroupSpec {
                name: "openers".into(),
                sections: vec![SectionSpec::new("opening", "Opening", SectionKind::General, 3)],
            }],
        )
    }

    #[test]
    fn test_records_round_trip_through_plan() {
        let pool = vec![
            Play::new("a", PlayCategory::RunGame, "Duo").with_formation("Trey"),
            Play::new("b", PlayCategory::QuickGame, "Stick"),
        ];
        let mut original = plan();
        let opening = original.section_mut("opening").unwrap();
        opening.add_play(pool[0].clone()).unwrap();
        opening.add_play(pool[1].clone()).unwrap();
        opening.toggle_lock(1).unwrap();
        opening.set_custom_text(0, Some("Trey Duo Rt".into())).unwrap();

        let records = section_records("team", "opp", original.section("opening").unwrap());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].call_text, "Trey a");
        assert_eq!(records[0].category, Some(PlayCategory::RunGame));

        let mut restored = plan();
        assert_eq!(apply_records(&mut restored, &records, &pool), 2);
        assert_eq!(
            restored.section("opening").unwrap(),
            original.section("opening").unwrap()
        );
    }

    #[test]
    fn test_apply_skips_bad_records() {
        let pool = vec![Play::new("a", PlayCategory::RunGame, "Duo")];
        let mut target = plan();
        let record = |section: &str, play: &str, position: usize, team: &str| SlotRecord {
            team_id: team.into(),
            opponent_id: "opp".into(),
            play_id: play.into(),
            section: section.into(),
            position,
            call_text: String::new(),
            customized_edit: None,
            is_locked: false,
            is_favorite: false,
            category: None,
            updated_at: Utc::now(),
        };
        let records = vec![
            record("missing", "a", 0, "team"),
            record("opening", "zzz", 0, "team"),
            record("opening", "a", 9, "team"),
            record("opening", "a", 0, "other"),
            record("OPENING", "a", 2, "team"),
        ];
        assert_eq!(apply_records(&mut target, &records, &pool), 1);
        assert!(target.section("opening").unwrap().slots[2].is_filled());
    }
}
