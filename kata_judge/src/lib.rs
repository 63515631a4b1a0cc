//! # Kata Judge
//!
//! Tournament tracking for judo kata competitions.
//!
//! A tournament runs on one or more mats. Each mat holds an ordered list of
//! groups, each group an ordered list of matches, and each match one score
//! sheet per judge. Judges work from tablets that repeatedly ask for the
//! next match on their mat, so the core questions this crate answers are
//! which match is up next, how a judge's sheet is merged without clobbering
//! the others, and how a completed match is kept from changing.
//!
//! ## Core Modules
//!
//! - [`tournament`]: the tournament aggregate, projections and manager
//! - [`kata`]: technique table and score sheets
//! - [`registry`]: judge and athlete registries
//! - [`storage`]: key-value storage port with memory, file and PostgreSQL engines
//! - [`ids`]: short random identifiers and judge access codes
//! - [`db`]: PostgreSQL pool for the `postgres` storage engine
//!
//! ## Example
//!
//! ```
//! use kata_judge::ids::NanoId;
//! use kata_judge::tournament::{GroupFields, Tournament};
//!
//! # fn demo(mut tournament: Tournament) -> kata_judge::tournament::TournamentResult<()> {
//! let mat = tournament.create_mat(&NanoId);
//! let seniors = GroupFields {
//!     name: "Seniors".to_string(),
//!     kata: "Nage-no-kata".to_string(),
//!     number_of_judges: 5,
//!     ..GroupFields::default()
//! };
//! tournament.create_group(mat, seniors)?;
//! assert_eq!(tournament.next_match(mat)?, None);
//! # Ok(())
//! # }
//! ```

/// PostgreSQL connection pool.
pub mod db;

/// Short random identifiers.
pub mod ids;

/// Kata technique table and score sheets.
pub mod kata;

/// Judge and athlete registries.
pub mod registry;

/// Key-value storage port and engines.
pub mod storage;

/// Tournament aggregate and manager.
pub mod tournament;

pub use kata::{Score, ScoreSheet};
pub use registry::{AthleteRegistry, JudgeRegistry, RegistryError};
pub use storage::{Storage, StorageBackend, StorageConfig, StorageError, StorageSet};
pub use tournament::{Tournament, TournamentError, TournamentManager};
