//! @acp:module "Memory Store"
//! @acp:summary "In-process collaborators with failure and latency injection"
//! @acp:domain store
//! @acp:layer io

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use super::{DistributionSource, GamePlanStore, PlayPoolSource, SlotRecord};
use crate::engine::{Distribution, DistributionKind, Play, SectionKey};
use crate::error::{GamePlanError, Result};

/// Play pool, scouting and slot records held in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    plays: Vec<Play>,
    distributions: HashMap<DistributionKind, Distribution>,
    records: Mutex<Vec<SlotRecord>>,
    failing: Mutex<HashSet<SectionKey>>,
    latency: Option<Duration>,
}

impl MemoryStore {
    pub fn new(plays: Vec<Play>) -> Self {
        Self {
            plays,
            ..Default::default()
        }
    }

    pub fn with_distribution(mut self, kind: DistributionKind, distribution: Distribution) -> Self {
        self.distributions.insert(kind, distribution);
        self
    }

    /// Delay every call, for exercising timeouts
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every persist of `section` fail until [`MemoryStore::heal`]
    pub fn fail_section(&self, section: impl Into<SectionKey>) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(section.into());
        }
    }

    pub fn heal(&self) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.clear();
        }
    }

    /// Snapshot of every stored record
    pub fn records(&self) -> Vec<SlotRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    async fn wait(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn poisoned(what: &str) -> GamePlanError {
        GamePlanError::Source(format!("{} lock poisoned", what))
    }
}

impl PlayPoolSource for MemoryStore {
    async fn fetch_play_pool(&self) -> Result<Vec<Play>> {
        self.wait().await;
        Ok(self.plays.clone())
    }
}

impl DistributionSource for MemoryStore {
    async fn fetch_distribution(&self, kind: DistributionKind) -> Result<Distribution> {
        self.wait().await;
        Ok(self.distributions.get(&kind).cloned().unwrap_or_default())
    }
}

impl GamePlanStore for MemoryStore {
    async fn persist_section(
        &self,
        team_id: &str,
        opponent_id: &str,
        section: &SectionKey,
        records: &[SlotRecord],
    ) -> Result<()> {
        self.wait().await;
        let failing = self
            .failing
            .lock()
            .map_err(|_| Self::poisoned("failure set"))?
            .contains(section);
        if failing {
            return Err(GamePlanError::Persistence {
                section: section.to_string(),
                reason: "store rejected the write".to_string(),
            });
        }

        let mut stored = self.records.lock().map_err(|_| Self::poisoned("records"))?;
        stored.retain(|r| !(r.belongs_to(team_id, opponent_id) && r.section == section.as_str()));
        stored.extend(records.iter().cloned());
        Ok(())
    }

    async fn load_records(&self, team_id: &str, opponent_id: &str) -> Result<Vec<SlotRecord>> {
        self.wait().await;
        let stored = self.records.lock().map_err(|_| Self::poisoned("records"))?;
        Ok(stored
            .iter()
            .filter(|r| r.belongs_to(team_id, opponent_id))
            .cloned()
            .collect())
    }

    async fn delete_all(&self, team_id: &str, opponent_id: &str) -> Result<()> {
        self.wait().await;
        let mut stored = self.records.lock().map_err(|_| Self::poisoned("records"))?;
        stored.retain(|r| !r.belongs_to(team_id, opponent_id));
        Ok(())
    }
}
