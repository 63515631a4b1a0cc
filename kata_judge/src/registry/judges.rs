//! Judge registry.

use super::errors::{RegistryError, RegistryResult};
use super::models::{Judge, JudgeData, JudgeSummary};
use crate::ids::{IdGenerator, JUDGE_ID_LEN, NanoId};
use crate::storage::Storage;
use std::sync::Arc;

/// Judge registry over the `judge` namespace
#[derive(Clone)]
pub struct JudgeRegistry {
    storage: Arc<dyn Storage>,
    ids: Arc<dyn IdGenerator>,
}

impl JudgeRegistry {
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

    /// Store a new judge under a fresh 4-character id
    pub async fn create(&self, data: JudgeData) -> RegistryResult<Judge> {
        let id = super::unused_id(self.storage.as_ref(), self.ids.as_ref(), JUDGE_ID_LEN).await?;
        self.storage
            .set_item(&id, serde_json::to_value(&data)?)
            .await?;
        log::info!("Registered judge {} '{}'", id, data.name);
        Ok(Judge { id, data })
    }

    /// Replace the record under `id`, creating it when absent
    pub async fn update(&self, id: &str, data: JudgeData) -> RegistryResult<Judge> {
        self.storage
            .set_item(id, serde_json::to_value(&data)?)
            .await?;
        Ok(Judge {
            id: id.to_string(),
            data,
        })
    }

    pub async fn get(&self, id: &str) -> RegistryResult<Option<Judge>> {
        match self.storage.get_item(id).await? {
            Some(value) => Ok(Some(Judge {
                id: id.to_string(),
                data: serde_json::from_value(value)?,
            })),
            None => Ok(None),
        }
    }

    /// Every judge without contact details, in key order
    ///
    /// Records that no longer decode are logged and left out.
    pub async fn list(&self) -> RegistryResult<Vec<JudgeSummary>> {
        let mut judges = Vec::new();
        for id in self.storage.get_keys().await? {
            match self.get(&id).await {
                Ok(Some(judge)) => judges.push(JudgeSummary::from(&judge)),
                Ok(None) => {}
                Err(RegistryError::Serialization(e)) => {
                    log::warn!("Skipping unreadable judge {}: {}", id, e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(judges)
    }

    /// Remove a judge; unknown ids are ignored
    pub async fn remove(&self, id: &str) -> RegistryResult<()> {
        self.storage.remove_item(id).await?;
        Ok(())
    }
}
