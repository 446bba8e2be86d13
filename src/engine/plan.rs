//! @acp:module "Game Plan"
//! @acp:summary "Section layout, group order and whole-plan operations"
//! @acp:domain engine
//! @acp:layer types

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::numbering::{numbering_for, script_lines, ScriptLine};
use super::section::{Section, SectionKey, SectionKind};
use super::types::{Distribution, DistributionKind};
use crate::error::{GamePlanError, Result};

/// Group holding sections generated from scouted fronts
pub const FRONTS_GROUP: &str = "fronts";
/// Group holding sections generated from scouted coverages
pub const COVERAGES_GROUP: &str = "coverages";

/// Declared section within a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub key: SectionKey,
    pub title: String,
    #[serde(flatten)]
    pub kind: SectionKind,
    pub capacity: usize,
    #[serde(default = "default_true")]
    pub visible: bool,
}

fn default_true() -> bool {
    true
}

impl SectionSpec {
    pub fn new(key: &str, title: &str, kind: SectionKind, capacity: usize) -> Self {
        Self {
            key: SectionKey::new(key),
            title: title.to_string(),
            kind,
            capacity,
            visible: true,
        }
    }

    pub fn build(&self) -> Section {
        let mut section = Section::new(self.key.clone(), self.title.clone(), self.kind.clone(), self.capacity);
        section.visible = self.visible;
        section
    }
}

/// Named, ordered group of sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionGroupSpec {
    pub name: String,
    #[serde(default)]
    pub sections: Vec<SectionSpec>,
}

/// Section mapping for one team/opponent pairing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePlan {
    pub team_id: String,
    pub opponent_id: String,
    /// Group name with its section keys, in display order
    pub groups: Vec<(String, Vec<SectionKey>)>,
    pub sections: HashMap<SectionKey, Section>,
}

impl GamePlan {
    /// Empty plan with every declared section created at its capacity
    pub fn new(team_id: &str, opponent_id: &str, layout: &[SectionGroupSpec]) -> Self {
        let mut groups = Vec::with_capacity(layout.len());
        let mut sections = HashMap::new();
        for group in layout {
            let mut keys = Vec::with_capacity(group.sections.len());
            for spec in &group.sections {
                if sections.contains_key(&spec.key) {
                    tracing::warn!("Duplicate section key in layout: {}", spec.key);
                    continue;
                }
                keys.push(spec.key.clone());
                sections.insert(spec.key.clone(), spec.build());
            }
            groups.push((group.name.clone(), keys));
        }
        Self {
            team_id: team_id.to_string(),
            opponent_id: opponent_id.to_string(),
            groups,
            sections,
        }
    }

    /// Section keys in display order
    pub fn ordered_keys(&self) -> Vec<SectionKey> {
        self.groups.iter().flat_map(|(_, keys)| keys.iter().cloned()).collect()
    }

    pub fn group_keys(&self) -> Vec<Vec<SectionKey>> {
        self.groups.iter().map(|(_, keys)| keys.clone()).collect()
    }

    pub fn section(&self, key: &str) -> Result<&Section> {
        self.sections
            .get(key)
            .ok_or_else(|| GamePlanError::UnknownSection(key.to_string()))
    }

    pub fn section_mut(&mut self, key: &str) -> Result<&mut Section> {
        self.sections
            .get_mut(key)
            .ok_or_else(|| GamePlanError::UnknownSection(key.to_string()))
    }

    /// Swap in a regenerated section
    pub fn replace_section(&mut self, section: Section) -> Result<()> {
        let slot = self.section_mut(section.key.as_str())?;
        *slot = section;
        Ok(())
    }

    pub fn set_visibility(&mut self, key: &str, visible: bool) -> Result<()> {
        self.section_mut(key)?.visible = visible;
        Ok(())
    }

    /// Starting display number per visible section
    pub fn numbering(&self) -> BTreeMap<SectionKey, usize> {
        numbering_for(&self.group_keys(), &HashMap::new(), &self.sections)
    }

    pub fn script(&self) -> Vec<ScriptLine> {
        script_lines(&self.group_keys(), &HashMap::new(), &self.sections)
    }

    /// Clear every slot of every section, locked ones included
    pub fn delete_all(&mut self) {
        for section in self.sections.values_mut() {
            for slot in &mut section.slots {
                slot.clear();
                slot.locked = false;
            }
        }
    }

    /// Create one beater section per scouted front and coverage.
    ///
    /// Buckets with a zero percentage get no section. Generated sections
    /// that no longer match a bucket are dropped unless they hold a locked
    /// slot. Returns the keys of the sections created.
    pub fn sync_scouting_sections(
        &mut self,
        fronts: &Distribution,
        coverages: &Distribution,
        capacity: usize,
    ) -> Vec<SectionKey> {
        let mut created = self.sync_group(FRONTS_GROUP, DistributionKind::Front, fronts, capacity);
        created.extend(self.sync_group(COVERAGES_GROUP, DistributionKind::Coverage, coverages, capacity));
        created
    }

    fn sync_group(
        &mut self,
        group: &str,
        kind: DistributionKind,
        distribution: &Distribution,
        capacity: usize,
    ) -> Vec<SectionKey> {
        let wanted: Vec<(SectionKey, String)> = distribution
            .active_buckets()
            .map(|(name, _)| (SectionKey::scouted(kind, name), name.clone()))
            .collect();

        let idx = match self.groups.iter().position(|(name, _)| name == group) {
            Some(idx) => idx,
            None => {
                self.groups.push((group.to_string(), Vec::new()));
                self.groups.len() - 1
            }
        };

        let existing = std::mem::take(&mut self.groups[idx].1);
        let mut keys = Vec::with_capacity(wanted.len());
        for key in existing {
            let keep = wanted.iter().any(|(k, _)| *k == key)
                || self
                    .sections
                    .get(&key)
                    .map(|s| s.slots.iter().any(|slot| slot.locked))
                    .unwrap_or(false);
            if keep {
                keys.push(key);
            } else {
                tracing::debug!(section = %key, "dropping stale scouting section");
                self.sections.remove(&key);
            }
        }

        let mut created = Vec::new();
        for (key, bucket) in wanted {
            if self.sections.contains_key(&key) {
                if !keys.contains(&key) {
                    tracing::warn!("Scouting section {} already declared elsewhere", key);
                }
                continue;
            }
            let (title, section_kind) = match kind {
                DistributionKind::Front => (
                    format!("{} Beaters", bucket),
                    SectionKind::FrontBeater { front: bucket },
                ),
                DistributionKind::Coverage => (
                    format!("{} Beaters", bucket),
                    SectionKind::CoverageBeater { coverage: bucket },
                ),
            };
            self.sections
                .insert(key.clone(), Section::new(key.clone(), title, section_kind, capacity));
            keys.push(key.clone());
            created.push(key);
        }

        self.groups[idx].1 = keys;
        created
    }
}
