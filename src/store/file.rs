//! @acp:module "File Store"
//! @acp:summary "JSON directory backing the play pool, scouting report and slot records"
//! @acp:domain store
//! @acp:layer io

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{DistributionSource, GamePlanStore, PlayPoolSource, SlotRecord};
use crate::engine::{Distribution, DistributionKind, Play, SectionKey};
use crate::error::{GamePlanError, Result};

pub const PLAYS_FILE: &str = "plays.json";
pub const SCOUTING_FILE: &str = "scouting.json";
pub const GAMEPLAN_FILE: &str = "gameplan.json";

/// Scouting percentages as stored in `scouting.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoutingReport {
    #[serde(default)]
    pub fronts: Distribution,
    #[serde(default)]
    pub coverages: Distribution,
}

impl ScoutingReport {
    pub fn get(&self, kind: DistributionKind) -> &Distribution {
        match kind {
            DistributionKind::Front => &self.fronts,
            DistributionKind::Coverage => &self.coverages,
        }
    }
}

/// Directory of JSON files:
///
/// - `plays.json`: array of plays
/// - `scouting.json`: `{"fronts": {...}, "coverages": {...}}`
/// - `gameplan.json`: array of slot records for every pairing
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Create the directory and empty data files that do not exist yet
    pub async fn init(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let defaults = [
            (PLAYS_FILE, "[]"),
            (SCOUTING_FILE, "{\"fronts\": {}, \"coverages\": {}}"),
            (GAMEPLAN_FILE, "[]"),
        ];
        for (file, content) in defaults {
            let path = self.path(file);
            if !tokio::fs::try_exists(&path).await? {
                tokio::fs::write(&path, content).await?;
                tracing::info!("Created {}", path.display());
            }
        }
        Ok(())
    }

    pub async fn scouting_report(&self) -> Result<ScoutingReport> {
        Ok(read_json_or_default(&self.path(SCOUTING_FILE)).await?)
    }

    async fn all_records(&self) -> Result<Vec<SlotRecord>> {
        read_json_or_default(&self.path(GAMEPLAN_FILE)).await
    }

    /// Write through a temp file so a failed write never truncates the plan
    async fn write_records(&self, records: &[SlotRecord]) -> Result<()> {
        let path = self.path(GAMEPLAN_FILE);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

async fn read_json_or_default<T>(path: &Path) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

impl PlayPoolSource for FileStore {
    async fn fetch_play_pool(&self) -> Result<Vec<Play>> {
        let path = self.path(PLAYS_FILE);
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            GamePlanError::Source(format!("failed to read {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl DistributionSource for FileStore {
    async fn fetch_distribution(&self, kind: DistributionKind) -> Result<Distribution> {
        let report = self.scouting_report().await?;
        Ok(report.get(kind).clone())
    }
}

impl GamePlanStore for FileStore {
    async fn persist_section(
        &self,
        team_id: &str,
        opponent_id: &str,
        section: &SectionKey,
        records: &[SlotRecord],
    ) -> Result<()> {
        let mut all = self.all_records().await?;
        all.retain(|r| !(r.belongs_to(team_id, opponent_id) && r.section == section.as_str()));
        all.extend(records.iter().cloned());
        self.write_records(&all)
            .await
            .map_err(|e| GamePlanError::Persistence {
                section: section.to_string(),
                reason: e.to_string(),
            })
    }

    async fn load_records(&self, team_id: &str, opponent_id: &str) -> Result<Vec<SlotRecord>> {
        let mut records = self.all_records().await?;
        records.retain(|r| r.belongs_to(team_id, opponent_id));
        Ok(records)
    }

    async fn delete_all(&self, team_id: &str, opponent_id: &str) -> Result<()> {
        let mut all = self.all_records().await?;
        all.retain(|r| !r.belongs_to(team_id, opponent_id));
        self.write_records(&all).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PlayCategory;
    use chrono::Utc;
    use tempfile::TempDir;

    fn record(section: &str, play: &str, position: usize, opponent: &str) -> SlotRecord {
        SlotRecord {
            team_id: "team".into(),
            opponent_id: opponent.into(),
            play_id: play.into(),
            section: section.into(),
            position,
            call_text: play.into(),
            customized_edit: None,
            is_locked: false,
            is_favorite: false,
            category: Some(PlayCategory::RunGame),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_init_creates_files() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("data"));
        store.init().await.unwrap();
        assert!(store.fetch_play_pool().await.unwrap().is_empty());
        assert!(store
            .fetch_distribution(DistributionKind::Front)
            .await
            .unwrap()
            .is_empty());
        assert!(store.load_records("team", "opp").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_play_pool_is_source_error() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let err = store.fetch_play_pool().await.unwrap_err();
        assert!(matches!(err, GamePlanError::Source(_)));
    }

    #[tokio::test]
    async fn test_persist_replaces_only_that_section() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let key = SectionKey::new("opening");

        store
            .persist_section("team", "opp", &key, &[record("opening", "a", 0, "opp")])
            .await
            .unwrap();
        store
            .persist_section(
                "team",
                "opp",
                &SectionKey::new("red-zone"),
                &[record("red-zone", "b", 0, "opp")],
            )
            .await
            .unwrap();
        store
            .persist_section("team", "other", &key, &[record("opening", "c", 0, "other")])
            .await
            .unwrap();
        store
            .persist_section("team", "opp", &key, &[record("opening", "d", 1, "opp")])
            .await
            .unwrap();

        let mut ids: Vec<String> = store
            .load_records("team", "opp")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.play_id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["b", "d"]);

        store.delete_all("team", "opp").await.unwrap();
        assert!(store.load_records("team", "opp").await.unwrap().is_empty());
        assert_eq!(store.load_records("team", "other").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_scouting_report_parses() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SCOUTING_FILE),
            r#"{"fronts": {"Bear": 60, "Over": 40}}"#,
        )
        .unwrap();
        let store = FileStore::new(dir.path());
        let fronts = store.fetch_distribution(DistributionKind::Front).await.unwrap();
        assert_eq!(fronts.total(), 100.0);
        assert!(store
            .fetch_distribution(DistributionKind::Coverage)
            .await
            .unwrap()
            .is_empty());
    }
}
