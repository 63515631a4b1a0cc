//! Tournament manager: loading, saving and listing tournament documents.

use super::aggregate::Tournament;
use super::errors::{TournamentError, TournamentResult};
use super::models::{NewTournament, TournamentDocument, TournamentId, TournamentSummary};
use crate::ids::{IdGenerator, NanoId, TOURNAMENT_ID_LEN};
use crate::storage::Storage;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Attempts at drawing an unused tournament id before giving up
const MAX_ID_ATTEMPTS: usize = 8;

/// Only the version stamp of a stored document, for the save check
#[derive(Deserialize)]
struct StoredVersion {
    #[serde(default)]
    version: u64,
}

/// Tournament manager
///
/// Tournaments are edited as whole documents: load, change the aggregate in
/// memory, then [`save`](Self::save). Saves are serialized and checked
/// against the version the aggregate was loaded with, so two writers working
/// from the same snapshot cannot silently overwrite each other.
#[derive(Clone)]
pub struct TournamentManager {
    storage: Arc<dyn Storage>,
    archive: Option<Arc<dyn Storage>>,
    ids: Arc<dyn IdGenerator>,
    save_lock: Arc<Mutex<()>>,
}

impl TournamentManager {
    /// Create a new tournament manager over the tournament namespace
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            archive: None,
            ids: Arc::new(NanoId),
            save_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Enable [`archive_tournament`](Self::archive_tournament)
    pub fn with_archive(mut self, archive: Arc<dyn Storage>) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Replace the id source (tournament ids and judge access codes)
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Id source to pass to [`Tournament::create_mat`]
    pub fn id_generator(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    /// Create and persist an empty tournament
    pub async fn create_tournament(&self, fields: NewTournament) -> TournamentResult<Tournament> {
        let _guard = self.save_lock.lock().await;

        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.generate(TOURNAMENT_ID_LEN);
            if self.storage.get_item(&id).await?.is_some() {
                log::debug!("Tournament id {} already taken, drawing another", id);
                continue;
            }

            let mut tournament = Tournament::new(id, fields, Utc::now());
            self.write(&mut tournament).await?;
            log::info!(
                "Created tournament {} '{}'",
                tournament.id(),
                tournament.name()
            );
            return Ok(tournament);
        }

        Err(TournamentError::IdsExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    /// Load a tournament, or `None` when no document exists under `id`
    pub async fn get_tournament(&self, id: &str) -> TournamentResult<Option<Tournament>> {
        match self.storage.get_item(id).await? {
            Some(value) => Ok(Some(decode(id, value)?)),
            None => Ok(None),
        }
    }

    /// Load a tournament that must exist
    pub async fn load(&self, id: &str) -> TournamentResult<Tournament> {
        self.get_tournament(id)
            .await?
            .ok_or_else(|| TournamentError::NotFound(id.to_string()))
    }

    /// Summaries of every stored tournament, ordered by id
    ///
    /// Documents that no longer decode are logged and left out rather than
    /// failing the whole listing.
    pub async fn list_tournaments(&self) -> TournamentResult<Vec<TournamentSummary>> {
        let mut summaries = Vec::new();
        for id in self.storage.get_keys().await? {
            match self.get_tournament(&id).await {
                Ok(Some(tournament)) => summaries.push(tournament.summary()),
                Ok(None) => {}
                Err(TournamentError::Serialization(e)) => {
                    log::warn!("Skipping unreadable tournament {}: {}", id, e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(summaries)
    }

    /// Persist the aggregate and bump its version
    ///
    /// Fails with [`TournamentError::Conflict`] when the stored document was
    /// saved by someone else after `tournament` was loaded, and with
    /// [`TournamentError::NotFound`] when it was removed meanwhile.
    pub async fn save(&self, tournament: &mut Tournament) -> TournamentResult<()> {
        let _guard = self.save_lock.lock().await;
        self.write(tournament).await
    }

    /// Load, apply `change`, and save in one step
    ///
    /// Nothing is written when `change` fails.
    pub async fn update_tournament<T, F>(
        &self,
        id: &str,
        change: F,
    ) -> TournamentResult<(Tournament, T)>
    where
        F: FnOnce(&mut Tournament) -> TournamentResult<T>,
    {
        let mut tournament = self.load(id).await?;
        let output = change(&mut tournament)?;
        self.save(&mut tournament).await?;
        Ok((tournament, output))
    }

    /// [`update_tournament`](Self::update_tournament), reloading and
    /// reapplying `change` after a [`TournamentError::Conflict`]
    ///
    /// `change` runs on a fresh load each time, so it must only write what
    /// it owns. At most `attempts` saves are tried.
    pub async fn update_tournament_retrying<T, F>(
        &self,
        id: &str,
        attempts: usize,
        mut change: F,
    ) -> TournamentResult<(Tournament, T)>
    where
        F: FnMut(&mut Tournament) -> TournamentResult<T>,
    {
        let mut attempt = 1;
        loop {
            match self.update_tournament(id, &mut change).await {
                Err(TournamentError::Conflict { .. }) if attempt < attempts => {
                    log::debug!("Retrying update of tournament {} after conflict", id);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Delete a tournament; returns whether it existed
    pub async fn remove_tournament(&self, id: &str) -> TournamentResult<bool> {
        let _guard = self.save_lock.lock().await;
        let existed = self.storage.get_item(id).await?.is_some();
        if existed {
            self.storage.remove_item(id).await?;
            log::info!("Removed tournament {}", id);
        }
        Ok(existed)
    }

    /// Move a tournament into the archive namespace
    pub async fn archive_tournament(&self, id: &str) -> TournamentResult<()> {
        let archive = self
            .archive
            .as_ref()
            .ok_or(TournamentError::ArchiveUnavailable)?;

        let _guard = self.save_lock.lock().await;
        let value = self
            .storage
            .get_item(id)
            .await?
            .ok_or_else(|| TournamentError::NotFound(id.to_string()))?;

        archive.set_item(id, value).await?;
        self.storage.remove_item(id).await?;
        log::info!("Archived tournament {}", id);
        Ok(())
    }

    /// Load an archived tournament
    pub async fn get_archived(&self, id: &str) -> TournamentResult<Option<Tournament>> {
        let archive = self
            .archive
            .as_ref()
            .ok_or(TournamentError::ArchiveUnavailable)?;
        match archive.get_item(id).await? {
            Some(value) => Ok(Some(decode(id, value)?)),
            None => Ok(None),
        }
    }

    /// Version-checked write; the caller holds `save_lock`
    async fn write(&self, tournament: &mut Tournament) -> TournamentResult<()> {
        let stored = match self.storage.get_item(tournament.id()).await? {
            Some(value) => Some(serde_json::from_value::<StoredVersion>(value)?.version),
            None => None,
        };

        match stored {
            Some(found) if found != tournament.version() => {
                log::warn!(
                    "Rejected stale save of tournament {}: loaded version {}, stored {}",
                    tournament.id(),
                    tournament.version(),
                    found
                );
                return Err(TournamentError::Conflict {
                    id: tournament.id().to_string(),
                    expected: tournament.version(),
                    found,
                });
            }
            None if tournament.version() != 0 => {
                return Err(TournamentError::NotFound(tournament.id().to_string()));
            }
            _ => {}
        }

        let now = Utc::now();
        let version = tournament.version() + 1;
        let mut document = tournament.document().clone();
        document.version = version;
        document.updated_at = now;

        self.storage
            .set_item(tournament.id(), serde_json::to_value(&document)?)
            .await?;
        tournament.mark_saved(version, now);

        log::debug!("Saved tournament {} at version {}", tournament.id(), version);
        Ok(())
    }
}

fn decode(id: &str, value: Value) -> TournamentResult<Tournament> {
    let document: TournamentDocument = serde_json::from_value(value)?;
    Ok(Tournament::from_document(TournamentId::from(id), document))
}
