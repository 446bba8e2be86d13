//! @acp:module "Global Numbering"
//! @acp:summary "Contiguous display numbers across visible sections for scripts and wristcoaches"
//! @acp:domain engine
//! @acp:layer logic

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::section::{Section, SectionKey, SectionKind};

/// Starting display number for every visible section.
///
/// Groups are walked in declared order. A visible section starts at one past
/// the filled-slot total of the visible sections before it; combo pairs
/// count as 2. Hidden sections get no entry and add nothing. An explicit
/// `visibility` entry wins over the section's own flag.
pub fn numbering_for(
    section_groups: &[Vec<SectionKey>],
    visibility: &HashMap<SectionKey, bool>,
    sections: &HashMap<SectionKey, Section>,
) -> BTreeMap<SectionKey, usize> {
    let mut starts = BTreeMap::new();
    let mut running = 0usize;

    for key in section_groups.iter().flatten() {
        let section = sections.get(key);
        let visible = visibility
            .get(key)
            .copied()
            .or_else(|| section.map(|s| s.visible))
            .unwrap_or(true);
        if !visible {
            continue;
        }
        starts.insert(key.clone(), running + 1);
        running += section.map(Section::numbering_weight).unwrap_or(0);
    }

    starts
}

/// One numbered line of a printed script
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptLine {
    pub number: usize,
    pub section: SectionKey,
    pub position: usize,
    pub text: String,
    pub favorite: bool,
    pub locked: bool,
}

/// Numbered lines for every filled slot of the visible sections
pub fn script_lines(
    section_groups: &[Vec<SectionKey>],
    visibility: &HashMap<SectionKey, bool>,
    sections: &HashMap<SectionKey, Section>,
) -> Vec<ScriptLine> {
    let starts = numbering_for(section_groups, visibility, sections);
    let mut lines = Vec::new();

    for key in section_groups.iter().flatten() {
        let (Some(start), Some(section)) = (starts.get(key), sections.get(key)) else {
            continue;
        };
        let mut number = *start;
        match section.kind {
            SectionKind::Combo => {
                for pair in section.slots.chunks(2) {
                    if !pair.iter().any(|s| s.is_filled()) {
                        continue;
                    }
                    for (offset, slot) in pair.iter().enumerate() {
                        if let Some(text) = slot.display_text() {
                            lines.push(line(number + offset, key, slot, text));
                        }
                    }
                    number += 2;
                }
            }
            _ => {
                for slot in section.slots.iter().filter(|s| s.is_filled()) {
                    let text = slot.display_text().unwrap_or_default();
                    lines.push(line(number, key, slot, text));
                    number += 1;
                }
            }
        }
    }

    lines
}

fn line(number: usize, key: &SectionKey, slot: &super::section::Slot, text: String) -> ScriptLine {
    ScriptLine {
        number,
        section: key.clone(),
        position: slot.position,
        text,
        favorite: slot.favorite,
        locked: slot.locked,
    }
}
