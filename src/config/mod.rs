//! @acp:module "Configuration"
//! @acp:summary "Planner configuration loading and the default section layout"
//! @acp:domain cli
//! @acp:layer config

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::{
    BaseFocus, Distribution, GamePlan, SectionGroupSpec, SectionKey, SectionKind, SectionSpec, Situation,
};
use crate::error::{GamePlanError, Result};

/// Default config file name in the working directory
pub const CONFIG_FILE: &str = ".gameplan.config.json";

/// Hard ceiling for a section's slot count (doubled for paired sections)
pub const DEFAULT_SLOT_CEILING: usize = 20;

fn default_data_dir() -> PathBuf {
    PathBuf::from(".gameplan")
}

fn default_slot_ceiling() -> usize {
    DEFAULT_SLOT_CEILING
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_scouted_capacity() -> usize {
    5
}

/// Per-section adjustments made after the layout was written
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

/// @acp:summary "Explicit planner state passed into every engine call"
/// @acp:lock normal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Team whose play pool is planned from
    pub team_id: String,

    /// Opponent the plan is built against
    pub opponent_id: String,

    /// Directory holding plays.json, scouting.json and gameplan.json
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Maximum slots per section
    #[serde(default = "default_slot_ceiling")]
    pub slot_ceiling: usize,

    /// Bound on every collaborator call, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Capacity of sections created from the scouting report
    #[serde(default = "default_scouted_capacity")]
    pub scouted_capacity: usize,

    /// Ordered section groups
    #[serde(default = "default_layout")]
    pub groups: Vec<SectionGroupSpec>,

    /// Category percentages for general sections, by section key
    #[serde(default)]
    pub category_mix: HashMap<SectionKey, Distribution>,

    /// Concept or formation focus for base package sections, by section key
    #[serde(default)]
    pub base_focus: HashMap<SectionKey, BaseFocus>,

    /// Capacity and visibility changes, including scouting sections
    #[serde(default)]
    pub overrides: HashMap<SectionKey, SectionOverride>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            team_id: "team".to_string(),
            opponent_id: "opponent".to_string(),
            data_dir: default_data_dir(),
            slot_ceiling: default_slot_ceiling(),
            timeout_ms: default_timeout_ms(),
            scouted_capacity: default_scouted_capacity(),
            groups: default_layout(),
            category_mix: default_category_mix(),
            base_focus: HashMap::new(),
            overrides: HashMap::new(),
        }
    }
}

impl PlannerConfig {
    /// @acp:summary "Load config from a JSON file"
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// @acp:summary "Save config to a file"
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @acp:summary "Load from default location or create default config"
    pub fn load_or_default() -> Self {
        Self::load(CONFIG_FILE).unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn focus_for(&self, key: &SectionKey) -> Option<&BaseFocus> {
        self.base_focus.get(key)
    }

    pub fn mix_for(&self, key: &SectionKey) -> Option<&Distribution> {
        self.category_mix.get(key)
    }

    /// Store a focus choice; setting one field clears the other
    pub fn set_focus(&mut self, key: SectionKey, focus: BaseFocus) {
        self.base_focus.insert(key, focus);
    }

    pub fn override_capacity(&mut self, key: SectionKey, capacity: usize) {
        self.overrides.entry(key).or_default().capacity = Some(capacity);
    }

    pub fn override_visibility(&mut self, key: SectionKey, visible: bool) {
        self.overrides.entry(key).or_default().visible = Some(visible);
    }

    /// Apply overrides to a freshly built plan. Unknown keys are ignored
    /// since scouting sections come and go.
    pub fn apply_overrides(&self, plan: &mut GamePlan) -> Result<()> {
        for (key, change) in &self.overrides {
            let Ok(section) = plan.section_mut(key.as_str()) else {
                tracing::debug!(section = %key, "override for absent section");
                continue;
            };
            if let Some(capacity) = change.capacity {
                section.resize(capacity, self.slot_ceiling)?;
            }
            if let Some(visible) = change.visible {
                section.visible = visible;
            }
        }
        Ok(())
    }

    /// Reject layouts and focus choices that allocation cannot run against
    pub fn validate(&self) -> Result<()> {
        if self.slot_ceiling == 0 {
            return Err(GamePlanError::invalid("*", "slot ceiling must be at least 1"));
        }
        for spec in self.groups.iter().flat_map(|g| &g.sections) {
            spec.build().validate(self.slot_ceiling)?;
        }
        for (key, focus) in &self.base_focus {
            focus.resolve(key.as_str())?;
        }
        Ok(())
    }
}

fn situational(key: &str, title: &str, situation: Situation, capacity: usize) -> SectionSpec {
    SectionSpec::new(key, title, SectionKind::Situational { situation }, capacity)
}

/// Section layout a new planner starts from
pub fn default_layout() -> Vec<SectionGroupSpec> {
    vec![
        SectionGroupSpec {
            name: "openers".to_string(),
            sections: vec![SectionSpec::new("opening-script", "Opening Script", SectionKind::General, 15)],
        },
        SectionGroupSpec {
            name: "base".to_string(),
            sections: vec![
                SectionSpec::new("base-1", "Base Package 1", SectionKind::BasePackage, 8),
                SectionSpec::new("base-2", "Base Package 2", SectionKind::BasePackage, 8),
                SectionSpec::new("run-vs-fronts", "Run Game vs Fronts", SectionKind::FrontMix, 8),
                SectionSpec::new("pass-vs-coverages", "Pass Game vs Coverages", SectionKind::CoverageMix, 8),
            ],
        },
        SectionGroupSpec {
            name: "situational".to_string(),
            sections: vec![
                situational("third-short", "3rd & Short", Situation::ThirdShort, 5),
                situational("third-medium", "3rd & Medium", Situation::ThirdMedium, 5),
                situational("third-long", "3rd & Long", Situation::ThirdLong, 5),
                situational("red-zone", "Red Zone", Situation::RedZone, 6),
                situational("goal-line", "Goal Line", Situation::GoalLine, 4),
                situational("two-point", "2-Point Plays", Situation::TwoPoint, 3),
            ],
        },
        SectionGroupSpec {
            name: "shots".to_string(),
            sections: vec![SectionSpec::new("play-action", "Play Action", SectionKind::PlayAction, 6)],
        },
        SectionGroupSpec {
            name: "combos".to_string(),
            sections: vec![SectionSpec::new("first-second-combos", "1st & 2nd Down Combos", SectionKind::Combo, 8)],
        },
    ]
}

fn default_category_mix() -> HashMap<SectionKey, Distribution> {
    let opening = Distribution::new()
        .with("run-game", 35.0)
        .with("rpo", 15.0)
        .with("quick-game", 20.0)
        .with("dropback", 10.0)
        .with("screen", 10.0)
        .with("shot-play", 10.0);
    let mut mix = HashMap::new();
    mix.insert(SectionKey::new("opening-script"), opening);
    mix
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = PlannerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.mix_for(&SectionKey::new("opening-script")).unwrap().total(), 100.0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut config = PlannerConfig::default();
        config.set_focus(SectionKey::new("base-1"), BaseFocus::concept("Mesh"));
        config.save(&path).unwrap();

        let loaded = PlannerConfig::load(&path).unwrap();
        assert_eq!(loaded.groups, config.groups);
        assert_eq!(
            loaded.focus_for(&SectionKey::new("base-1")),
            Some(&BaseFocus::concept("Mesh"))
        );
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: PlannerConfig =
            serde_json::from_str(r#"{"team_id": "t", "opponent_id": "o"}"#).unwrap();
        assert_eq!(config.slot_ceiling, DEFAULT_SLOT_CEILING);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(!config.groups.is_empty());
        assert!(config.category_mix.is_empty());
    }

    #[test]
    fn test_validate_rejects_conflicting_focus() {
        let mut config = PlannerConfig::default();
        config.base_focus.insert(
            SectionKey::new("base-1"),
            BaseFocus {
                concept: Some("Mesh".into()),
                formation: Some("Trips".into()),
            },
        );
        assert!(config.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_overrides_resize_and_hide() {
        let mut config = PlannerConfig::default();
        config.override_capacity(SectionKey::new("red-zone"), 2);
        config.override_visibility(SectionKey::new("red-zone"), false);
        config.override_visibility(SectionKey::new("front:bear"), false);

        let mut plan = GamePlan::new("t", "o", &config.groups);
        config.apply_overrides(&mut plan).unwrap();
        let red_zone = plan.section("red-zone").unwrap();
        assert_eq!(red_zone.capacity(), 2);
        assert!(!red_zone.visible);
    }

    #[test]
    fn test_validate_rejects_odd_combo_capacity() {
        let mut config = PlannerConfig::default();
        config.groups.push(SectionGroupSpec {
            name: "extra".into(),
            sections: vec![SectionSpec::new("odd", "Odd", SectionKind::Combo, 3)],
        });
        assert!(config.validate().is_err());
    }
}
