//! @acp:module "Concept Sampler"
//! @acp:summary "Two-pass random sampling that prefers unique concepts"
//! @acp:domain engine
//! @acp:layer logic

use std::collections::HashSet;

use rand::seq::SliceRandom;

use super::random::RandomSource;
use super::types::Play;

/// Result of a sampling pass
#[derive(Debug, Clone, Default)]
pub struct SampleOutcome {
    pub selected: Vec<Play>,
    /// Input concepts plus every concept accepted in this pass
    pub used_concepts: HashSet<String>,
}

impl SampleOutcome {
    pub fn is_short(&self, requested: usize) -> bool {
        self.selected.len() < requested
    }
}

/// Pick up to `count` plays from `candidates`.
///
/// Pass 1 walks a shuffled copy and accepts plays whose concept is not in
/// `used_concepts`. Pass 2 fills the remainder from the plays pass 1 did not
/// accept, ignoring concepts. The result may be shorter than `count` when the
/// candidates run out.
pub fn sample<R: RandomSource + ?Sized>(
    candidates: &[Play],
    count: usize,
    used_concepts: HashSet<String>,
    rng: &mut R,
) -> SampleOutcome {
    let mut used = used_concepts;
    if count == 0 || candidates.is_empty() {
        return SampleOutcome {
            selected: Vec::new(),
            used_concepts: used,
        };
    }

    let mut shuffled: Vec<&Play> = candidates.iter().collect();
    shuffled.shuffle(rng);

    let mut accepted = vec![false; shuffled.len()];
    let mut selected = Vec::with_capacity(count.min(shuffled.len()));

    for (idx, play) in shuffled.iter().enumerate() {
        if selected.len() >= count {
            break;
        }
        match play.concept_key() {
            Some(key) if used.contains(&key) => continue,
            Some(key) => {
                used.insert(key);
            }
            None => {}
        }
        accepted[idx] = true;
        selected.push((*play).clone());
    }

    if selected.len() < count {
        tracing::debug!(
            unique = selected.len(),
            count,
            "concept pool exhausted, allowing repeats"
        );
        for (idx, play) in shuffled.iter().enumerate() {
            if selected.len() >= count {
                break;
            }
            if accepted[idx] {
                continue;
            }
            if let Some(key) = play.concept_key() {
                used.insert(key);
            }
            selected.push((*play).clone());
        }
    }

    SampleOutcome {
        selected,
        used_concepts: used,
    }
}
