//! @acp:module "Planner"
//! @acp:summary "Orchestrates regeneration: snapshot, select, persist with a bound, commit on success"
//! @acp:domain engine
//! @acp:layer service
//!
//! The planner is the only place that awaits. Each collaborator call is
//! wrapped in the configured timeout; a section is swapped into the plan
//! only once the store has accepted it.

use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Mutex;

use crate::config::PlannerConfig;
use crate::engine::{
    generate_section, Distribution, DistributionKind, GamePlan, Notice, Play, RandomSource,
    Section, SectionKey, SelectionContext,
};
use crate::error::{GamePlanError, Result};
use crate::store::{
    apply_records, section_records, DistributionSource, GamePlanStore, PlayPoolSource,
};

/// Whether a section may be regenerated right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionState {
    Stable,
    Regenerating,
}

/// Play pool and scouting fetched once for a batch of regenerations
#[derive(Debug, Clone, Default)]
pub struct PoolSnapshot {
    pub plays: Vec<Play>,
    pub fronts: Distribution,
    pub coverages: Distribution,
}

impl PoolSnapshot {
    pub fn scouting(&self, kind: DistributionKind) -> &Distribution {
        match kind {
            DistributionKind::Front => &self.fronts,
            DistributionKind::Coverage => &self.coverages,
        }
    }
}

/// Result of one committed section regeneration
#[derive(Debug, Clone, Serialize)]
pub struct SectionReport {
    pub section: SectionKey,
    pub filled: usize,
    pub capacity: usize,
    pub notices: Vec<Notice>,
}

/// Result of regenerating every section of a plan
#[derive(Debug, Default)]
pub struct RegenerationSummary {
    pub reports: Vec<SectionReport>,
    pub failures: Vec<(SectionKey, GamePlanError)>,
}

impl RegenerationSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.reports.iter().flat_map(|r| r.notices.iter())
    }
}

/// Marks a section as regenerating until dropped
#[derive(Debug)]
pub struct GenerationGuard<'p> {
    generating: &'p Mutex<HashSet<SectionKey>>,
    key: SectionKey,
}

impl Drop for GenerationGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut generating) = self.generating.lock() {
            generating.remove(&self.key);
        }
    }
}

/// @acp:summary "Regeneration orchestrator over the three collaborators"
/// @acp:lock normal
pub struct Planner<'a, P, D, S> {
    pool: &'a P,
    scouting: &'a D,
    store: &'a S,
    config: PlannerConfig,
    generating: Mutex<HashSet<SectionKey>>,
}

impl<'a, P, D, S> Planner<'a, P, D, S>
where
    P: PlayPoolSource,
    D: DistributionSource,
    S: GamePlanStore,
{
    pub fn new(pool: &'a P, scouting: &'a D, store: &'a S, config: PlannerConfig) -> Self {
        Self {
            pool,
            scouting,
            store,
            config,
            generating: Mutex::new(HashSet::new()),
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let timeout = self.config.timeout();
        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("{} timed out after {:?}", operation, timeout);
                Err(GamePlanError::Timeout { operation, timeout })
            }
        }
    }

    pub fn state(&self, key: &SectionKey) -> SectionState {
        let busy = self
            .generating
            .lock()
            .map(|g| g.contains(key))
            .unwrap_or(false);
        if busy {
            SectionState::Regenerating
        } else {
            SectionState::Stable
        }
    }

    /// Claim `key` for regeneration; fails if another regeneration holds it
    pub fn begin(&self, key: &SectionKey) -> Result<GenerationGuard<'_>> {
        let mut generating = self
            .generating
            .lock()
            .map_err(|_| GamePlanError::Source("generating set lock poisoned".to_string()))?;
        if !generating.insert(key.clone()) {
            return Err(GamePlanError::RegenerationInProgress(key.to_string()));
        }
        Ok(GenerationGuard {
            generating: &self.generating,
            key: key.clone(),
        })
    }

    /// Fetch the pool and both scouting distributions
    pub async fn snapshot(&self) -> Result<PoolSnapshot> {
        let plays = self
            .bounded("fetch play pool", self.pool.fetch_play_pool())
            .await?;
        let fronts = self
            .bounded(
                "fetch front distribution",
                self.scouting.fetch_distribution(DistributionKind::Front),
            )
            .await?;
        let coverages = self
            .bounded(
                "fetch coverage distribution",
                self.scouting.fetch_distribution(DistributionKind::Coverage),
            )
            .await?;
        tracing::debug!(plays = plays.len(), "fetched pool snapshot");
        Ok(PoolSnapshot {
            plays,
            fronts,
            coverages,
        })
    }

    /// Build the plan from the configured layout and scouting, then apply
    /// whatever the store holds for this pairing
    pub async fn open(&self) -> Result<GamePlan> {
        self.config.validate()?;
        let snapshot = self.snapshot().await?;
        let mut plan = GamePlan::new(
            &self.config.team_id,
            &self.config.opponent_id,
            &self.config.groups,
        );
        let created = plan.sync_scouting_sections(
            &snapshot.fronts,
            &snapshot.coverages,
            self.config.scouted_capacity,
        );
        tracing::debug!(created = created.len(), "created scouting sections");
        self.config.apply_overrides(&mut plan)?;

        let records = self
            .bounded(
                "load records",
                self.store.load_records(&plan.team_id, &plan.opponent_id),
            )
            .await?;
        let applied = apply_records(&mut plan, &records, &snapshot.plays);
        tracing::info!(
            "Opened plan {} vs {} ({} of {} records applied)",
            plan.team_id,
            plan.opponent_id,
            applied,
            records.len()
        );
        Ok(plan)
    }

    /// Regenerate one section against a fresh snapshot
    pub async fn regenerate_section<R: RandomSource + ?Sized>(
        &self,
        plan: &mut GamePlan,
        key: &str,
        rng: &mut R,
    ) -> Result<SectionReport> {
        let snapshot = self.snapshot().await?;
        self.regenerate_with(plan, key, &snapshot, rng).await
    }

    /// Regenerate one section from `snapshot`.
    ///
    /// On any error the section in `plan` is left as it was.
    pub async fn regenerate_with<R: RandomSource + ?Sized>(
        &self,
        plan: &mut GamePlan,
        key: &str,
        snapshot: &PoolSnapshot,
        rng: &mut R,
    ) -> Result<SectionReport> {
        let key = SectionKey::new(key);
        let _guard = self.begin(&key)?;

        let current = plan.section(key.as_str())?;
        let ctx = SelectionContext {
            pool: &snapshot.plays,
            scouting: current.kind.distribution_kind().map(|k| snapshot.scouting(k)),
            category_mix: self.config.mix_for(&key),
            focus: self.config.focus_for(&key),
        };
        let outcome = generate_section(current, &ctx, self.config.slot_ceiling, rng)?;

        self.persist(plan, &outcome.section).await?;

        let report = SectionReport {
            section: key,
            filled: outcome.section.filled_count(),
            capacity: outcome.section.capacity(),
            notices: outcome.notices,
        };
        plan.replace_section(outcome.section)?;
        tracing::info!(
            "Regenerated {} ({}/{})",
            report.section,
            report.filled,
            report.capacity
        );
        Ok(report)
    }

    /// Regenerate every section in display order, one at a time.
    ///
    /// A failing section is recorded and skipped. `on_section` runs after
    /// each attempt, successful or not.
    pub async fn regenerate_all<R, F>(
        &self,
        plan: &mut GamePlan,
        rng: &mut R,
        mut on_section: F,
    ) -> Result<RegenerationSummary>
    where
        R: RandomSource + ?Sized,
        F: FnMut(&SectionKey, std::result::Result<&SectionReport, &GamePlanError>),
    {
        let snapshot = self.snapshot().await?;
        let mut summary = RegenerationSummary::default();
        for key in plan.ordered_keys() {
            match self.regenerate_with(plan, key.as_str(), &snapshot, rng).await {
                Ok(report) => {
                    on_section(&key, Ok(&report));
                    summary.reports.push(report);
                }
                Err(e) => {
                    tracing::warn!("Failed to regenerate {}: {}", key, e);
                    on_section(&key, Err(&e));
                    summary.failures.push((key, e));
                }
            }
        }
        Ok(summary)
    }

    /// Persist a manually edited section, then swap it into the plan
    pub async fn commit_section(&self, plan: &mut GamePlan, section: Section) -> Result<()> {
        section.validate(self.config.slot_ceiling)?;
        let _guard = self.begin(&section.key)?;
        self.persist(plan, &section).await?;
        plan.replace_section(section)
    }

    /// Remove every stored slot for the pairing and clear the plan
    pub async fn delete_all(&self, plan: &mut GamePlan) -> Result<()> {
        self.bounded(
            "delete plan",
            self.store.delete_all(&plan.team_id, &plan.opponent_id),
        )
        .await?;
        plan.delete_all();
        tracing::info!("Deleted plan {} vs {}", plan.team_id, plan.opponent_id);
        Ok(())
    }

    async fn persist(&self, plan: &GamePlan, section: &Section) -> Result<()> {
        let records = section_records(&plan.team_id, &plan.opponent_id, section);
        self.bounded(
            "persist section",
            self.store
                .persist_section(&plan.team_id, &plan.opponent_id, &section.key, &records),
        )
        .await
    }
}
