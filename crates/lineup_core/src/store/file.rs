use super::document::{now_ms, StoreDocument};
use super::{
    starter_rows, CommitFailure, CommitStep, LineupStore, RosterSource, RoundStore, TeamStore,
};
use crate::error::StoreError;
use crate::models::{
    Athlete, AthleteId, Lineup, LineupId, LineupMember, LineupUpsert, Round, RoundId, Team,
};
use async_trait::async_trait;
use std::fs::{remove_file, rename, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Store backed by a single JSON document on disk.
///
/// Every write loads the document, applies the change and replaces the file
/// through a temp file + rename, so readers never see a half-written file.
/// A lineup commit is written in one replace.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open an existing store file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            return Err(StoreError::NotFound(format!("store file {}", path.display())));
        }
        let store = Self { path, write_lock: Mutex::new(()) };
        store.load()?;
        Ok(store)
    }

    /// Write `doc` to `path`, replacing any existing file.
    pub fn create(path: impl Into<PathBuf>, doc: &StoreDocument) -> Result<Self, StoreError> {
        let path = path.into();
        save_to_path(&path, doc)?;
        Ok(Self { path, write_lock: Mutex::new(()) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<StoreDocument, StoreError> {
        let data = std::fs::read(&self.path)?;
        let doc: StoreDocument = serde_json::from_slice(&data)?;
        doc.check_version()?;
        Ok(doc)
    }

    /// Load, mutate and write back while holding the process-local write lock.
    fn update<T>(
        &self,
        f: impl FnOnce(&mut StoreDocument) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut doc = self.load()?;
        let out = f(&mut doc)?;
        save_to_path(&self.path, &doc)?;
        Ok(out)
    }
}

fn save_to_path(path: &Path, doc: &StoreDocument) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let data = serde_json::to_vec_pretty(doc)?;
    let temp_path = path.with_extension("tmp");

    if let Err(e) = write_temp(&temp_path, &data).and_then(|()| rename(&temp_path, path)) {
        if let Err(cleanup) = remove_file(&temp_path) {
            tracing::warn!(path = %temp_path.display(), error = %cleanup, "temp file left behind");
        }
        return Err(e.into());
    }

    tracing::debug!(bytes = data.len(), path = %path.display(), "store document written");
    Ok(())
}

fn write_temp(temp_path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(data)?;
    file.flush()?;
    file.sync_all()
}

#[async_trait]
impl RosterSource for JsonFileStore {
    async fn list_candidates(&self, round_id: Option<RoundId>) -> Result<Vec<Athlete>, StoreError> {
        Ok(self.load()?.candidates(round_id))
    }
}

#[async_trait]
impl TeamStore for JsonFileStore {
    async fn get_team(&self, user_id: &str) -> Result<Option<Team>, StoreError> {
        Ok(self.load()?.team_for_owner(user_id))
    }
}

#[async_trait]
impl RoundStore for JsonFileStore {
    async fn get_open_round(&self) -> Result<Option<Round>, StoreError> {
        Ok(self.load()?.open_round())
    }
}

#[async_trait]
impl LineupStore for JsonFileStore {
    async fn upsert_lineup(&self, lineup: &LineupUpsert) -> Result<LineupId, StoreError> {
        self.update(|doc| Ok(doc.upsert_lineup(lineup, now_ms())))
    }

    async fn delete_members(&self, lineup_id: &str) -> Result<(), StoreError> {
        self.update(|doc| {
            doc.delete_members(lineup_id);
            Ok(())
        })
    }

    async fn insert_members(&self, members: &[LineupMember]) -> Result<(), StoreError> {
        self.update(|doc| doc.insert_members(members))
    }

    async fn get_lineup(
        &self,
        team_id: &str,
        round_id: RoundId,
    ) -> Result<Option<Lineup>, StoreError> {
        Ok(self.load()?.lineup(team_id, round_id))
    }

    async fn list_members(&self, lineup_id: &str) -> Result<Vec<LineupMember>, StoreError> {
        Ok(self.load()?.members(lineup_id))
    }

    async fn commit_lineup(
        &self,
        lineup: &LineupUpsert,
        athlete_ids: &[AthleteId],
    ) -> Result<LineupId, CommitFailure> {
        // Nothing reaches disk unless every step succeeds; the step only
        // labels which part of the document change was refused.
        let mut step = CommitStep::UpsertLineup;
        let result = self.update(|doc| {
            let lineup_id = doc.upsert_lineup(lineup, now_ms());
            doc.delete_members(&lineup_id);
            step = CommitStep::InsertMembers;
            doc.insert_members(&starter_rows(&lineup_id, athlete_ids))?;
            step = CommitStep::UpsertLineup;
            Ok(lineup_id)
        });
        result.map_err(|e| CommitFailure::at(step, None, e))
    }
}
