//! @acp:module "Notices"
//! @acp:summary "Non-blocking informational outcomes of a section allocation"
//! @acp:domain engine
//! @acp:layer types

use serde::Serialize;
use std::fmt;

/// Informational outcome of an allocation; never an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Notice {
    /// The section's filter matched no plays at all
    NoCandidates { section: String },
    /// Fewer plays than free slots
    PartialFill {
        section: String,
        requested: usize,
        filled: usize,
    },
    /// A weighted bucket could not supply its share; the deficit was backfilled
    /// from the other buckets' candidates
    BucketShortfall {
        section: String,
        bucket: String,
        requested: usize,
        filled: usize,
    },
    /// Neither a concept nor a formation was chosen for a base package
    AutoFocus { section: String, focus: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoCandidates { section } => {
                write!(f, "{}: no plays match this section", section)
            }
            Notice::PartialFill {
                section,
                requested,
                filled,
            } => write!(f, "{}: filled {} of {} open slots", section, filled, requested),
            Notice::BucketShortfall {
                section,
                bucket,
                requested,
                filled,
            } => write!(
                f,
                "{}: '{}' supplied {} of {} plays",
                section, bucket, filled, requested
            ),
            Notice::AutoFocus { section, focus } => {
                write!(f, "{}: auto-selected focus {}", section, focus)
            }
        }
    }
}
