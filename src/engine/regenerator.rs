//! @acp:module "Locked-Slot Regenerator"
//! @acp:summary "Merge freshly sampled plays into the unlocked positions of a section"
//! @acp:domain engine
//! @acp:layer logic

use rand::seq::SliceRandom;

use super::random::RandomSource;
use super::section::Section;
use super::types::Play;

/// Rebuild `section` with `new_plays` in its unlocked positions.
///
/// Locked slots stay where they are with their play, favorite flag and
/// custom text. Unlocked slots are cleared, the free positions are shuffled,
/// and plays are dealt onto them in order. Positions left over stay empty;
/// plays left over are dropped. Paired sections take `new_plays` two at a
/// time, see [`regenerate_units`].
pub fn regenerate_section<R: RandomSource + ?Sized>(
    section: &Section,
    new_plays: Vec<Play>,
    rng: &mut R,
) -> Section {
    let width = section.slot_width();
    let mut units: Vec<Vec<Play>> = Vec::new();
    let mut current = Vec::with_capacity(width);
    for play in new_plays {
        current.push(play);
        if current.len() == width {
            units.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        units.push(current);
    }
    regenerate_units(section, units, rng)
}

/// Like [`regenerate_section`] with plays already grouped per unit.
///
/// A unit is one slot, or a first/second-down pair in combo sections. A
/// unit is free only when none of its slots is locked. A short unit leaves
/// its trailing slots empty.
pub fn regenerate_units<R: RandomSource + ?Sized>(
    section: &Section,
    units: Vec<Vec<Play>>,
    rng: &mut R,
) -> Section {
    let mut result = section.clone();
    let width = result.slot_width();

    result.clear_unlocked();
    result.renumber();

    let mut available = result.available_units();
    available.shuffle(rng);

    let offered = units.len();
    let mut placed = 0;
    for (start, unit) in available.iter().zip(units) {
        for (offset, play) in unit.into_iter().take(width).enumerate() {
            if let Some(slot) = result.slots.get_mut(start + offset) {
                slot.play = Some(play);
            }
        }
        placed += 1;
    }

    tracing::debug!(
        section = %result.key,
        free = available.len(),
        offered,
        placed,
        "regenerated section"
    );
    result
}
