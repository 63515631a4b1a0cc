//! Athlete registry.

use super::errors::{RegistryError, RegistryResult};
use super::models::{Athlete, AthleteData};
use crate::ids::{ATHLETE_ID_LEN, IdGenerator, NanoId};
use crate::storage::Storage;
use std::sync::Arc;

/// Athlete registry over the `athlete` namespace
#[derive(Clone)]
pub struct AthleteRegistry {
    storage: Arc<dyn Storage>,
    ids: Arc<dyn IdGenerator>,
}

impl AthleteRegistry {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            ids: Arc::new(NanoId),
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Store a new athlete under a fresh 6-character id
    ///
    /// The name is trimmed; a blank name is rejected.
    pub async fn create(&self, mut data: AthleteData) -> RegistryResult<Athlete> {
        data.name = data.name.trim().to_string();
        if data.name.is_empty() {
            return Err(RegistryError::Validation(
                "athlete name is required".to_string(),
            ));
        }

        let id =
            super::unused_id(self.storage.as_ref(), self.ids.as_ref(), ATHLETE_ID_LEN).await?;
        self.storage
            .set_item(&id, serde_json::to_value(&data)?)
            .await?;
        log::info!("Registered athlete {} '{}'", id, data.name);
        Ok(Athlete { id, data })
    }

    pub async fn get(&self, id: &str) -> RegistryResult<Option<Athlete>> {
        match self.storage.get_item(id).await? {
            Some(value) => Ok(Some(Athlete {
                id: id.to_string(),
                data: serde_json::from_value(value)?,
            })),
            None => Ok(None),
        }
    }

    /// Every athlete, in key order
    ///
    /// Records that no longer decode are logged and left out.
    pub async fn list(&self) -> RegistryResult<Vec<Athlete>> {
        let mut athletes = Vec::new();
        for id in self.storage.get_keys().await? {
            match self.get(&id).await {
                Ok(Some(athlete)) => athletes.push(athlete),
                Ok(None) => {}
                Err(RegistryError::Serialization(e)) => {
                    log::warn!("Skipping unreadable athlete {}: {}", id, e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(athletes)
    }

    /// Remove an athlete; unknown ids are ignored
    pub async fn remove(&self, id: &str) -> RegistryResult<()> {
        self.storage.remove_item(id).await?;
        Ok(())
    }
}
