//! @acp:module "Sections"
//! @acp:summary "Sections, slots and the manual slot operations that keep positions compact"
//! @acp:domain engine
//! @acp:layer types
//!
//! A section always holds exactly `capacity` slots with positions
//! `0..capacity`. Every mutation ends with a renumbering pass.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use super::types::{DistributionKind, Play, Situation};
use crate::error::{GamePlanError, Result};

/// Stable, lower-case section identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SectionKey(String);

impl SectionKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(key.as_ref().trim().to_lowercase())
    }

    /// Key for a section generated from a scouting bucket, e.g. `front:bear`
    pub fn scouted(kind: DistributionKind, bucket: &str) -> Self {
        let slug: String = bucket
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect();
        Self::new(format!("{}:{}", kind.as_str(), slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SectionKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SectionKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<SectionKey> for String {
    fn from(value: SectionKey) -> Self {
        value.0
    }
}

impl Borrow<str> for SectionKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Selection policy of a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum SectionKind {
    /// Whole pool, optionally shaped by a configured category mix
    General,
    /// Single concept or formation focus
    BasePackage,
    FrontBeater { front: String },
    CoverageBeater { coverage: String },
    /// Run game weighted by the scouted front distribution
    FrontMix,
    /// Pass game weighted by the scouted coverage distribution
    CoverageMix,
    Situational { situation: Situation },
    PlayAction,
    /// Paired first/second-down calls
    Combo,
}

impl SectionKind {
    /// Number of slots that move together
    pub fn slot_width(&self) -> usize {
        match self {
            SectionKind::Combo => 2,
            _ => 1,
        }
    }

    /// Scouting distribution this policy needs, if any
    pub fn distribution_kind(&self) -> Option<DistributionKind> {
        match self {
            SectionKind::FrontMix => Some(DistributionKind::Front),
            SectionKind::CoverageMix => Some(DistributionKind::Coverage),
            _ => None,
        }
    }
}

/// One position within a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub position: usize,
    #[serde(default)]
    pub play: Option<Play>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_text: Option<String>,
}

impl Slot {
    pub fn empty(position: usize) -> Self {
        Self {
            position,
            play: None,
            locked: false,
            favorite: false,
            custom_text: None,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.play.is_some()
    }

    /// Text shown on printed scripts: custom edit, else the play's call
    pub fn display_text(&self) -> Option<String> {
        if let Some(text) = self.custom_text.as_deref().filter(|t| !t.trim().is_empty()) {
            return Some(text.trim().to_string());
        }
        self.play.as_ref().map(Play::call_text)
    }

    /// Drop occupant and per-occupant decorations, keep the position
    pub fn clear(&mut self) {
        self.play = None;
        self.favorite = false;
        self.custom_text = None;
    }
}

/// A named, fixed-capacity group of slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub key: SectionKey,
    pub title: String,
    pub kind: SectionKind,
    pub slots: Vec<Slot>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl Section {
    pub fn new(
        key: impl Into<SectionKey>,
        title: impl Into<String>,
        kind: SectionKind,
        capacity: usize,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            kind,
            slots: (0..capacity).map(Slot::empty).collect(),
            visible: true,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slot_width(&self) -> usize {
        self.kind.slot_width()
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_filled()).count()
    }

    /// Contribution to global numbering; a combo pair counts as 2
    pub fn numbering_weight(&self) -> usize {
        match self.kind {
            SectionKind::Combo => {
                2 * self
                    .slots
                    .chunks(2)
                    .filter(|pair| pair.iter().any(Slot::is_filled))
                    .count()
            }
            _ => self.filled_count(),
        }
    }

    pub fn slot(&self, position: usize) -> Option<&Slot> {
        self.slots.get(position)
    }

    /// Whether any slot of the unit starting at `start` is locked
    pub fn unit_locked(&self, start: usize) -> bool {
        self.slots
            .iter()
            .skip(start)
            .take(self.slot_width())
            .any(|s| s.locked)
    }

    /// Unit start positions that regeneration may overwrite
    pub fn available_units(&self) -> Vec<usize> {
        (0..self.capacity())
            .step_by(self.slot_width())
            .filter(|start| !self.unit_locked(*start))
            .collect()
    }

    /// Largest capacity allowed for this section under `ceiling`
    pub fn max_capacity(&self, ceiling: usize) -> usize {
        ceiling * self.slot_width()
    }

    /// Reject configurations that allocation cannot run against
    pub fn validate(&self, ceiling: usize) -> Result<()> {
        validate_capacity(self, self.capacity(), ceiling)
    }

    /// Rewrite positions to `0..capacity` in slot order
    pub(crate) fn renumber(&mut self) {
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            slot.position = idx;
        }
    }

    fn check_position(&self, position: usize) -> Result<()> {
        if position < self.capacity() {
            Ok(())
        } else {
            Err(GamePlanError::InvalidPosition {
                section: self.key.to_string(),
                position,
            })
        }
    }

    fn unit_start(&self, position: usize) -> usize {
        position - position % self.slot_width()
    }

    /// Place a play into the first empty slot, returning its position
    pub fn add_play(&mut self, play: Play) -> Result<usize> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| !s.is_filled() && !s.locked)
            .ok_or_else(|| GamePlanError::SectionFull(self.key.to_string()))?;
        slot.play = Some(play);
        Ok(slot.position)
    }

    /// Remove the slot (or combo pair) at `position`, shifting later slots up
    pub fn remove_at(&mut self, position: usize) -> Result<Vec<Play>> {
        self.check_position(position)?;
        let start = self.unit_start(position);
        if self.unit_locked(start) {
            return Err(GamePlanError::SlotLocked {
                section: self.key.to_string(),
                position,
            });
        }

        let end = (start + self.slot_width()).min(self.capacity());
        let removed: Vec<Play> = self
            .slots
            .drain(start..end)
            .filter_map(|s| s.play)
            .collect();
        let len = self.slots.len();
        self.slots.extend((len..len + (end - start)).map(Slot::empty));
        self.renumber();
        Ok(removed)
    }

    /// Move the slot (or combo pair) at `from` so it lands at `to`
    pub fn move_slot(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_position(from)?;
        self.check_position(to)?;
        let width = self.slot_width();
        let from = self.unit_start(from);
        let to = self.unit_start(to);
        if from == to {
            return Ok(());
        }

        let end = (from + width).min(self.capacity());
        let unit: Vec<Slot> = self.slots.drain(from..end).collect();
        let at = to.min(self.slots.len());
        self.slots.splice(at..at, unit);
        self.renumber();
        Ok(())
    }

    /// Flip the lock on a slot; combo pairs lock together. Returns the new state.
    pub fn toggle_lock(&mut self, position: usize) -> Result<bool> {
        self.check_position(position)?;
        let start = self.unit_start(position);
        let width = self.slot_width();
        let locked = !self.slots[position].locked;
        for slot in self.slots.iter_mut().skip(start).take(width) {
            slot.locked = locked;
        }
        Ok(locked)
    }

    pub fn toggle_favorite(&mut self, position: usize) -> Result<bool> {
        self.check_position(position)?;
        let slot = &mut self.slots[position];
        slot.favorite = !slot.favorite;
        Ok(slot.favorite)
    }

    /// Set or clear the custom text shown instead of the play call
    pub fn set_custom_text(&mut self, position: usize, text: Option<String>) -> Result<()> {
        self.check_position(position)?;
        self.slots[position].custom_text = text.filter(|t| !t.trim().is_empty());
        Ok(())
    }

    /// Change capacity, appending empty slots or truncating the tail
    pub fn resize(&mut self, capacity: usize, ceiling: usize) -> Result<()> {
        validate_capacity(self, capacity, ceiling)?;
        if capacity < self.capacity() {
            if let Some(slot) = self.slots[capacity..].iter().find(|s| s.locked) {
                return Err(GamePlanError::invalid(
                    self.key.as_str(),
                    format!("shrinking to {} would drop locked slot {}", capacity, slot.position),
                ));
            }
            self.slots.truncate(capacity);
        } else {
            let len = self.slots.len();
            self.slots.extend((len..capacity).map(Slot::empty));
        }
        self.renumber();
        Ok(())
    }

    /// Clear every unlocked slot in place
    pub fn clear_unlocked(&mut self) {
        for slot in self.slots.iter_mut().filter(|s| !s.locked) {
            slot.clear();
        }
    }
}

fn validate_capacity(section: &Section, capacity: usize, ceiling: usize) -> Result<()> {
    let key = section.key.as_str();
    if capacity == 0 {
        return Err(GamePlanError::invalid(key, "capacity must be at least 1"));
    }
    let max = section.max_capacity(ceiling);
    if capacity > max {
        return Err(GamePlanError::invalid(
            key,
            format!("capacity {} exceeds the ceiling of {}", capacity, max),
        ));
    }
    if capacity % section.slot_width() != 0 {
        return Err(GamePlanError::invalid(
            key,
            format!("paired section capacity must be even, got {}", capacity),
        ));
    }
    Ok(())
}
