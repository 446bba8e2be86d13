//! @acp:module "Engine Types"
//! @acp:summary "Play pool and scouting distribution data contracts"
//! @acp:domain engine
//! @acp:layer types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::tags::{self, deserialize_tag_list};

/// Play-type category used for bucket allocation and combo pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayCategory {
    RunGame,
    Rpo,
    QuickGame,
    Dropback,
    Screen,
    MovingPocket,
    ShotPlay,
}

impl PlayCategory {
    pub const ALL: [PlayCategory; 7] = [
        PlayCategory::RunGame,
        PlayCategory::Rpo,
        PlayCategory::QuickGame,
        PlayCategory::Dropback,
        PlayCategory::Screen,
        PlayCategory::MovingPocket,
        PlayCategory::ShotPlay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayCategory::RunGame => "run-game",
            PlayCategory::Rpo => "rpo",
            PlayCategory::QuickGame => "quick-game",
            PlayCategory::Dropback => "dropback",
            PlayCategory::Screen => "screen",
            PlayCategory::MovingPocket => "moving-pocket",
            PlayCategory::ShotPlay => "shot-play",
        }
    }

}

impl fmt::Display for PlayCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = tags::normalize(s).replace([' ', '_'], "-");
        match key.as_str() {
            "run-game" | "run" => Ok(PlayCategory::RunGame),
            "rpo" => Ok(PlayCategory::Rpo),
            "quick-game" | "quick" => Ok(PlayCategory::QuickGame),
            "dropback" | "drop-back" => Ok(PlayCategory::Dropback),
            "screen" | "screen-game" => Ok(PlayCategory::Screen),
            "moving-pocket" => Ok(PlayCategory::MovingPocket),
            "shot-play" | "shot" | "shots" => Ok(PlayCategory::ShotPlay),
            _ => Err(format!("Unknown play category: {}", s)),
        }
    }
}

/// Down-and-distance and field-position situations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Situation {
    ThirdShort,
    ThirdMedium,
    ThirdLong,
    RedZone,
    GoalLine,
    TwoPoint,
}

impl Situation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Situation::ThirdShort => "third-short",
            Situation::ThirdMedium => "third-medium",
            Situation::ThirdLong => "third-long",
            Situation::RedZone => "red-zone",
            Situation::GoalLine => "goal-line",
            Situation::TwoPoint => "two-point",
        }
    }

    /// Whether the play carries this situation's flag
    pub fn applies_to(&self, play: &Play) -> bool {
        let flags = &play.situations;
        match self {
            Situation::ThirdShort => flags.third_short,
            Situation::ThirdMedium => flags.third_medium,
            Situation::ThirdLong => flags.third_long,
            Situation::RedZone => flags.red_zone,
            Situation::GoalLine => flags.goal_line,
            Situation::TwoPoint => flags.two_point,
        }
    }
}

/// Situational flags carried by a play
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SituationFlags {
    pub third_short: bool,
    pub third_medium: bool,
    pub third_long: bool,
    pub red_zone: bool,
    pub goal_line: bool,
    pub two_point: bool,
}

/// A play from the team's pool. Immutable for the duration of a regeneration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Play {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub category: Option<PlayCategory>,

    /// Core scheme label, the diversity key during sampling
    #[serde(default)]
    pub concept: String,

    #[serde(default)]
    pub formation: String,

    #[serde(default)]
    pub situations: SituationFlags,

    /// Defensive fronts this play counters
    #[serde(default, deserialize_with = "deserialize_tag_list")]
    pub front_beaters: Vec<String>,

    /// Coverages this play counters
    #[serde(default, deserialize_with = "deserialize_tag_list")]
    pub coverage_beaters: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_protection: Option<String>,

    /// Custom display text replacing the generated call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customized_name: Option<String>,
}

impl Play {
    pub fn new(id: impl Into<String>, category: PlayCategory, concept: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            category: Some(category),
            concept: concept.into(),
            formation: String::new(),
            situations: SituationFlags::default(),
            front_beaters: Vec::new(),
            coverage_beaters: Vec::new(),
            pass_protection: None,
            customized_name: None,
        }
    }

    pub fn with_formation(mut self, formation: impl Into<String>) -> Self {
        self.formation = formation.into();
        self
    }

    pub fn with_front_beaters(mut self, fronts: &str) -> Self {
        self.front_beaters = tags::parse_tag_list(fronts);
        self
    }

    pub fn with_coverage_beaters(mut self, coverages: &str) -> Self {
        self.coverage_beaters = tags::parse_tag_list(coverages);
        self
    }

    pub fn with_protection(mut self, protection: impl Into<String>) -> Self {
        self.pass_protection = Some(protection.into());
        self
    }

    pub fn with_situations(mut self, situations: SituationFlags) -> Self {
        self.situations = situations;
        self
    }

    pub fn is_category(&self, category: PlayCategory) -> bool {
        self.category == Some(category)
    }

    /// Key used for concept deduplication; `None` for a blank concept
    pub fn concept_key(&self) -> Option<String> {
        let key = tags::normalize(&self.concept);
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }

    /// Rendered call text: the custom override, else "<formation> <name>"
    pub fn call_text(&self) -> String {
        if let Some(custom) = self.customized_name.as_deref().filter(|c| !c.trim().is_empty()) {
            return custom.trim().to_string();
        }
        let formation = self.formation.trim();
        let name = self.name.trim();
        match (formation.is_empty(), name.is_empty()) {
            (true, _) => name.to_string(),
            (false, true) => formation.to_string(),
            (false, false) => format!("{} {}", formation, name),
        }
    }
}

/// Which scouting distribution to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionKind {
    Front,
    Coverage,
}

impl DistributionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionKind::Front => "front",
            DistributionKind::Coverage => "coverage",
        }
    }
}

/// Named buckets with a percentage (0-100) each.
///
/// Sums below 100 leave the remainder unallocated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distribution(pub BTreeMap<String, f64>);

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, bucket: impl Into<String>, percentage: f64) -> Self {
        self.0.insert(bucket.into(), percentage);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }

    /// Buckets with a usable (finite, positive) percentage
    pub fn active_buckets(&self) -> impl Iterator<Item = (&String, f64)> {
        self.0
            .iter()
            .map(|(name, pct)| (name, sanitize_percentage(*pct)))
            .filter(|(_, pct)| *pct > 0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.values().map(|p| sanitize_percentage(*p)).sum()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Distribution {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Percentages outside `0..=100` are clamped; non-finite ones count as zero
pub(crate) fn sanitize_percentage(pct: f64) -> f64 {
    if pct.is_finite() && pct > 0.0 {
        pct.min(100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_str_variants() {
        assert_eq!("Run Game".parse::<PlayCategory>().unwrap(), PlayCategory::RunGame);
        assert_eq!("RPO".parse::<PlayCategory>().unwrap(), PlayCategory::Rpo);
        assert_eq!("quick_game".parse::<PlayCategory>().unwrap(), PlayCategory::QuickGame);
        assert_eq!("Shot Play".parse::<PlayCategory>().unwrap(), PlayCategory::ShotPlay);
        assert!("trick".parse::<PlayCategory>().is_err());
    }

    #[test]
    fn test_play_deserializes_joined_beaters() {
        let json = r#"{
            "id": "p1",
            "name": "Duo",
            "category": "run-game",
            "concept": "Duo",
            "formation": "Trips Rt",
            "front_beaters": "Bear, Under",
            "coverage_beaters": ["Cover 2", "Cover 3, Cover 4"],
            "situations": { "third_short": true }
        }"#;
        let play: Play = serde_json::from_str(json).unwrap();
        assert_eq!(play.front_beaters, vec!["Bear", "Under"]);
        assert_eq!(play.coverage_beaters, vec!["Cover 2", "Cover 3", "Cover 4"]);
        assert!(play.situations.third_short);
        assert!(!play.situations.red_zone);
    }

    #[test]
    fn test_play_minimal_json() {
        let play: Play = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert!(play.category.is_none());
        assert!(play.front_beaters.is_empty());
        assert_eq!(play.concept_key(), None);
    }

    #[test]
    fn test_play_null_beaters() {
        let play: Play =
            serde_json::from_str(r#"{"id": "x", "front_beaters": null, "coverage_beaters": "Cover 3"}"#)
                .unwrap();
        assert!(play.front_beaters.is_empty());
        assert_eq!(play.coverage_beaters, vec!["Cover 3".to_string()]);
    }

    #[test]
    fn test_call_text() {
        let play = Play::new("Mesh", PlayCategory::QuickGame, "Mesh").with_formation("Doubles Lt");
        assert_eq!(play.call_text(), "Doubles Lt Mesh");

        let mut custom = play.clone();
        custom.customized_name = Some("  Mesh Wheel  ".to_string());
        assert_eq!(custom.call_text(), "Mesh Wheel");
    }

    #[test]
    fn test_distribution_ignores_bad_percentages() {
        let d = Distribution::new()
            .with("A", 40.0)
            .with("B", -5.0)
            .with("C", f64::NAN);
        assert_eq!(d.total(), 40.0);
        assert_eq!(d.active_buckets().count(), 1);
    }

    #[test]
    fn test_distribution_clamps_large_percentages() {
        let d = Distribution::new().with("A", 250.0).with("B", 1e300);
        assert_eq!(d.total(), 200.0);
    }
}
