//! @acp:module "Allocation Engine"
//! @acp:summary "Play allocation: weighted buckets, concept-diverse sampling, lock-aware placement"
//! @acp:domain engine
//! @acp:layer feature
//!
//! Everything in this module is synchronous and free of I/O. A section is
//! generated from a read-only play pool snapshot, so independent sections
//! can be generated in parallel.

pub mod allocator;
pub mod combo;
pub mod notice;
pub mod numbering;
pub mod plan;
pub mod policy;
pub mod random;
pub mod regenerator;
pub mod sampler;
pub mod section;
pub mod tags;
pub mod types;

pub use allocator::allocate;
pub use notice::Notice;
pub use numbering::{numbering_for, script_lines, ScriptLine};
pub use plan::{GamePlan, SectionGroupSpec, SectionSpec};
pub use policy::{select_plays, BaseFocus, FocusFilter, Selection, SelectionContext};
pub use random::RandomSource;
pub use regenerator::{regenerate_section, regenerate_units};
pub use sampler::{sample, SampleOutcome};
pub use section::{Section, SectionKey, SectionKind, Slot};
pub use types::{Distribution, DistributionKind, Play, PlayCategory, Situation, SituationFlags};

use crate::error::Result;

/// A regenerated section and what happened while filling it
#[derive(Debug, Clone)]
pub struct SectionOutcome {
    pub section: Section,
    pub notices: Vec<Notice>,
}

/// Validate, select and place plays for one section.
///
/// Returns a new section; the input is left untouched so callers can commit
/// the result only once it has been persisted.
pub fn generate_section<R: RandomSource + ?Sized>(
    section: &Section,
    ctx: &SelectionContext<'_>,
    slot_ceiling: usize,
    rng: &mut R,
) -> Result<SectionOutcome> {
    section.validate(slot_ceiling)?;
    let selection = select_plays(section, ctx, rng)?;
    let regenerated = regenerate_units(section, selection.units, rng);
    Ok(SectionOutcome {
        section: regenerated,
        notices: selection.notices,
    })
}
