//! Judge and athlete registries.
//!
//! Flat collections of people, independent of any tournament. Mat rosters
//! copy a judge's display name rather than referencing a registry id, so
//! editing or removing a registry record never touches a tournament.

pub mod athletes;
pub mod errors;
pub mod judges;
pub mod models;

pub use athletes::AthleteRegistry;
pub use errors::{RegistryError, RegistryResult};
pub use judges::JudgeRegistry;
pub use models::{Athlete, AthleteData, AthleteId, Judge, JudgeData, JudgeId, JudgeSummary};

use crate::ids::IdGenerator;
use crate::storage::Storage;

/// Attempts at drawing an unused record id before giving up
const MAX_ID_ATTEMPTS: usize = 8;

/// Draw an id of `len` characters that is not yet a key in `storage`
async fn unused_id(
    storage: &dyn Storage,
    ids: &dyn IdGenerator,
    len: usize,
) -> RegistryResult<String> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let id = ids.generate(len);
        if storage.get_item(&id).await?.is_none() {
            return Ok(id);
        }
        log::debug!("Registry id {} already taken, drawing another", id);
    }
    Err(RegistryError::IdsExhausted {
        attempts: MAX_ID_ATTEMPTS,
    })
}
