//! @acp:module "Selection Policies"
//! @acp:summary "Per-section pre-filters and the allocate-then-sample pipeline"
//! @acp:domain engine
//! @acp:layer logic
//!
//! Each section kind narrows the play pool with a pure filter, optionally
//! splits its open slots across weighted buckets, then samples for concept
//! diversity. Placement into slots is left to the regenerator.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::allocator::allocate;
use super::combo;
use super::notice::Notice;
use super::random::RandomSource;
use super::sampler::sample;
use super::section::{Section, SectionKind};
use super::tags::{contains_tag, normalize, words};
use super::types::{Distribution, Play, PlayCategory, Situation};
use crate::error::{GamePlanError, Result};

const RUN_CATEGORIES: [PlayCategory; 2] = [PlayCategory::RunGame, PlayCategory::Rpo];
const PASS_CATEGORIES: [PlayCategory; 3] = [
    PlayCategory::QuickGame,
    PlayCategory::Dropback,
    PlayCategory::ShotPlay,
];

/// Stored focus choice for a base package section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseFocus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formation: Option<String>,
}

impl BaseFocus {
    pub fn concept(concept: impl Into<String>) -> Self {
        Self {
            concept: Some(concept.into()),
            formation: None,
        }
    }

    pub fn formation(formation: impl Into<String>) -> Self {
        Self {
            concept: None,
            formation: Some(formation.into()),
        }
    }

    /// Turn the stored choice into a filter; both set is a configuration error
    pub fn resolve(&self, section: &str) -> Result<Option<FocusFilter>> {
        let concept = self.concept.as_deref().map(str::trim).filter(|c| !c.is_empty());
        let formation = self.formation.as_deref().map(str::trim).filter(|f| !f.is_empty());
        match (concept, formation) {
            (Some(_), Some(_)) => Err(GamePlanError::invalid(
                section,
                "concept and formation focus are mutually exclusive",
            )),
            (Some(c), None) => Ok(Some(FocusFilter::Concept(c.to_string()))),
            (None, Some(f)) => Ok(Some(FocusFilter::Formation(f.to_string()))),
            (None, None) => Ok(None),
        }
    }
}

/// The single value a base package section is built around
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusFilter {
    Concept(String),
    Formation(String),
}

impl FocusFilter {
    pub fn matches(&self, play: &Play) -> bool {
        match self {
            FocusFilter::Concept(c) => normalize(&play.concept) == normalize(c),
            FocusFilter::Formation(f) => normalize(&play.formation) == normalize(f),
        }
    }
}

impl fmt::Display for FocusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FocusFilter::Concept(c) => write!(f, "concept '{}'", c),
            FocusFilter::Formation(v) => write!(f, "formation '{}'", v),
        }
    }
}

/// Read-only inputs for one section's selection
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionContext<'a> {
    /// Play pool snapshot
    pub pool: &'a [Play],
    /// Scouting distribution for front/coverage mix sections
    pub scouting: Option<&'a Distribution>,
    /// Category percentages for general sections
    pub category_mix: Option<&'a Distribution>,
    /// Focus choice for base package sections
    pub focus: Option<&'a BaseFocus>,
}

/// Plays chosen for a section, grouped per slot unit
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub units: Vec<Vec<Play>>,
    pub notices: Vec<Notice>,
}

impl Selection {
    pub fn play_count(&self) -> usize {
        self.units.iter().map(Vec::len).sum()
    }
}

// =============================================================================
// Pre-filters
// =============================================================================

pub fn by_categories(pool: &[Play], categories: &[PlayCategory]) -> Vec<Play> {
    pool.iter()
        .filter(|p| p.category.map(|c| categories.contains(&c)).unwrap_or(false))
        .cloned()
        .collect()
}

/// Run-game and RPO plays tagged as beating `front`
pub fn front_beaters(pool: &[Play], front: &str) -> Vec<Play> {
    pool.iter()
        .filter(|p| p.category.map(|c| RUN_CATEGORIES.contains(&c)).unwrap_or(false))
        .filter(|p| contains_tag(&p.front_beaters, front))
        .cloned()
        .collect()
}

/// Quick-game, dropback and shot plays tagged as beating `coverage`
pub fn coverage_beaters(pool: &[Play], coverage: &str) -> Vec<Play> {
    pool.iter()
        .filter(|p| p.category.map(|c| PASS_CATEGORIES.contains(&c)).unwrap_or(false))
        .filter(|p| contains_tag(&p.coverage_beaters, coverage))
        .cloned()
        .collect()
}

pub fn situational(pool: &[Play], situation: Situation) -> Vec<Play> {
    pool.iter()
        .filter(|p| situation.applies_to(p))
        .cloned()
        .collect()
}

/// Shot plays, or anything protected with a PA or boot call
pub fn play_action(pool: &[Play]) -> Vec<Play> {
    pool.iter()
        .filter(|p| {
            p.is_category(PlayCategory::ShotPlay)
                || p.pass_protection
                    .as_deref()
                    .map(|pro| words(pro).any(|w| w == "pa" || w == "boot" || w == "bootleg"))
                    .unwrap_or(false)
        })
        .cloned()
        .collect()
}

pub fn base_package(pool: &[Play], focus: &FocusFilter) -> Vec<Play> {
    pool.iter().filter(|p| focus.matches(p)).cloned().collect()
}

/// Pick the most frequent concept or formation, whichever covers more plays.
/// Concept wins a tie.
pub fn auto_focus(pool: &[Play]) -> Option<FocusFilter> {
    let concept = most_frequent(pool.iter().map(|p| p.concept.as_str()));
    let formation = most_frequent(pool.iter().map(|p| p.formation.as_str()));
    match (concept, formation) {
        (Some((c, cn)), Some((f, fn_))) => {
            if fn_ > cn {
                Some(FocusFilter::Formation(f))
            } else {
                Some(FocusFilter::Concept(c))
            }
        }
        (Some((c, _)), None) => Some(FocusFilter::Concept(c)),
        (None, Some((f, _))) => Some(FocusFilter::Formation(f)),
        (None, None) => None,
    }
}

fn most_frequent<'a>(labels: impl Iterator<Item = &'a str>) -> Option<(String, usize)> {
    let mut counts: HashMap<String, (String, usize)> = HashMap::new();
    for label in labels {
        let key = normalize(label);
        if key.is_empty() {
            continue;
        }
        counts
            .entry(key)
            .or_insert_with(|| (label.trim().to_string(), 0))
            .1 += 1;
    }
    counts
        .into_iter()
        .max_by(|(ka, (_, a)), (kb, (_, b))| a.cmp(b).then_with(|| kb.cmp(ka)))
        .map(|(_, value)| value)
}

// =============================================================================
// Selection pipeline
// =============================================================================

/// Choose plays for the unlocked units of `section`.
///
/// Plays already sitting in locked slots are excluded and their concepts
/// count as used. Configuration problems are rejected before any sampling.
pub fn select_plays<R: RandomSource + ?Sized>(
    section: &Section,
    ctx: &SelectionContext<'_>,
    rng: &mut R,
) -> Result<Selection> {
    let key = section.key.as_str();
    let focus = match (&section.kind, ctx.focus) {
        (SectionKind::BasePackage, Some(focus)) => focus.resolve(key)?,
        _ => None,
    };

    let target = section.available_units().len();
    let mut notices = Vec::new();
    if target == 0 {
        return Ok(Selection::default());
    }

    let mut locked_ids = HashSet::new();
    let mut used = HashSet::new();
    for play in section.slots.iter().filter(|s| s.locked).filter_map(|s| s.play.as_ref()) {
        locked_ids.insert(play.id.clone());
        if let Some(concept) = play.concept_key() {
            used.insert(concept);
        }
    }
    let pool: Vec<Play> = ctx
        .pool
        .iter()
        .filter(|p| !locked_ids.contains(&p.id))
        .cloned()
        .collect();

    let units: Vec<Vec<Play>> = match &section.kind {
        SectionKind::Combo => combo::select_pairs(&pool, target, used, rng),
        kind => {
            let plays = match kind {
                SectionKind::General => match ctx.category_mix.filter(|d| !d.is_empty()) {
                    Some(mix) => {
                        let buckets = mix
                            .iter()
                            .map(|(name, _)| (name.clone(), category_bucket(&pool, name)))
                            .collect();
                        weighted(key, buckets, mix, target, used, rng, &mut notices)
                    }
                    None => sample(&pool, target, used, rng).selected,
                },
                SectionKind::BasePackage => {
                    let focus = match focus {
                        Some(focus) => Some(focus),
                        None => {
                            let auto = auto_focus(&pool);
                            if let Some(ref f) = auto {
                                notices.push(Notice::AutoFocus {
                                    section: key.to_string(),
                                    focus: f.to_string(),
                                });
                            }
                            auto
                        }
                    };
                    let candidates = focus
                        .map(|f| base_package(&pool, &f))
                        .unwrap_or_default();
                    sample(&candidates, target, used, rng).selected
                }
                SectionKind::FrontBeater { front } => {
                    sample(&front_beaters(&pool, front), target, used, rng).selected
                }
                SectionKind::CoverageBeater { coverage } => {
                    sample(&coverage_beaters(&pool, coverage), target, used, rng).selected
                }
                SectionKind::FrontMix => {
                    let base = by_categories(&pool, &RUN_CATEGORIES);
                    scouted_mix(key, &base, ctx.scouting, front_beaters, target, used, rng, &mut notices)
                }
                SectionKind::CoverageMix => {
                    let base = by_categories(&pool, &PASS_CATEGORIES);
                    scouted_mix(key, &base, ctx.scouting, coverage_beaters, target, used, rng, &mut notices)
                }
                SectionKind::Situational { situation } => {
                    sample(&situational(&pool, *situation), target, used, rng).selected
                }
                SectionKind::PlayAction => sample(&play_action(&pool), target, used, rng).selected,
                SectionKind::Combo => Vec::new(),
            };
            plays.into_iter().map(|p| vec![p]).collect()
        }
    };

    let requested = target * section.slot_width();
    let filled: usize = units.iter().map(Vec::len).sum();
    if filled == 0 {
        tracing::info!(section = key, "no candidate plays");
        notices.push(Notice::NoCandidates {
            section: key.to_string(),
        });
    } else if filled < requested {
        tracing::info!(section = key, filled, requested, "section partially filled");
        notices.push(Notice::PartialFill {
            section: key.to_string(),
            requested,
            filled,
        });
    }

    Ok(Selection { units, notices })
}

fn category_bucket(pool: &[Play], bucket: &str) -> Vec<Play> {
    match bucket.parse::<PlayCategory>() {
        Ok(category) => by_categories(pool, &[category]),
        Err(e) => {
            tracing::warn!("Ignoring category mix bucket: {}", e);
            Vec::new()
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn scouted_mix<R: RandomSource + ?Sized>(
    section: &str,
    base: &[Play],
    scouting: Option<&Distribution>,
    beaters: fn(&[Play], &str) -> Vec<Play>,
    target: usize,
    used: HashSet<String>,
    rng: &mut R,
    notices: &mut Vec<Notice>,
) -> Vec<Play> {
    match scouting.filter(|d| !d.is_empty()) {
        Some(dist) => {
            let buckets = dist
                .iter()
                .map(|(name, _)| (name.clone(), beaters(base, name)))
                .collect();
            weighted(section, buckets, dist, target, used, rng, notices)
        }
        None => {
            tracing::debug!(section, "no scouting distribution, sampling unweighted");
            sample(base, target, used, rng).selected
        }
    }
}

/// Allocate `target` across buckets, sample each with a shared concept set,
/// then backfill bucket deficits from the union of all bucket candidates.
///
/// Only the allocated slots are filled; a distribution summing under 100
/// leaves the remainder empty.
fn weighted<R: RandomSource + ?Sized>(
    section: &str,
    buckets: Vec<(String, Vec<Play>)>,
    distribution: &Distribution,
    target: usize,
    used: HashSet<String>,
    rng: &mut R,
    notices: &mut Vec<Notice>,
) -> Vec<Play> {
    let counts = allocate(target, distribution);
    let allocated: usize = counts.values().sum();
    let mut used = used;
    let mut taken: HashSet<String> = HashSet::new();
    let mut union: Vec<Play> = Vec::new();
    let mut union_ids: HashSet<String> = HashSet::new();
    let mut selected: Vec<Play> = Vec::with_capacity(allocated);

    for (bucket, candidates) in buckets {
        let count = counts.get(&bucket).copied().unwrap_or(0);
        if count == 0 {
            continue;
        }
        for play in &candidates {
            if union_ids.insert(play.id.clone()) {
                union.push(play.clone());
            }
        }
        let fresh: Vec<Play> = candidates
            .into_iter()
            .filter(|p| !taken.contains(&p.id))
            .collect();
        let outcome = sample(&fresh, count, used, rng);
        used = outcome.used_concepts;
        if outcome.selected.len() < count {
            notices.push(Notice::BucketShortfall {
                section: section.to_string(),
                bucket: bucket.clone(),
                requested: count,
                filled: outcome.selected.len(),
            });
        }
        for play in outcome.selected {
            taken.insert(play.id.clone());
            selected.push(play);
        }
    }

    if selected.len() < allocated {
        let rest: Vec<Play> = union
            .into_iter()
            .filter(|p| !taken.contains(&p.id))
            .collect();
        let outcome = sample(&rest, allocated - selected.len(), used, rng);
        selected.extend(outcome.selected);
    }

    selected
}
