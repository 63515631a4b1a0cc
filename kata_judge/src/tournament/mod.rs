//! Kata tournaments: mats, groups, matches and judge score sheets.
//!
//! This module provides:
//! - The [`Tournament`] aggregate with positional editing of its schedule
//! - Next-match resolution per mat and the completed-match latch
//! - Mat display and judge projections
//! - [`TournamentManager`] for versioned persistence over a [`Storage`](crate::storage::Storage)
//!
//! ## Example
//!
//! ```no_run
//! use kata_judge::storage::MemoryStorage;
//! use kata_judge::tournament::{GroupFields, MatchFields, NewTournament, TournamentManager};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = TournamentManager::new(Arc::new(MemoryStorage::new()));
//!
//!     let mut tournament = manager.create_tournament(NewTournament::default()).await?;
//!     let mat = tournament.create_mat(manager.id_generator());
//!     let group = tournament.create_group(
//!         mat,
//!         GroupFields {
//!             name: "Seniors".to_string(),
//!             kata: "Nage-no-kata".to_string(),
//!             number_of_judges: 5,
//!             ..GroupFields::default()
//!         },
//!     )?;
//!     tournament.create_match(
//!         mat,
//!         group,
//!         MatchFields {
//!             tori: "Tanaka".to_string(),
//!             uke: "Suzuki".to_string(),
//!             ..MatchFields::default()
//!         },
//!     )?;
//!     manager.save(&mut tournament).await?;
//!
//!     if let Some(pending) = tournament.next_match(mat)? {
//!         println!("Up next: {} / {}", pending.match_view.tori, pending.match_view.uke);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod errors;
pub mod manager;
pub mod models;

pub use aggregate::Tournament;
pub use errors::{TournamentError, TournamentResult};
pub use manager::TournamentManager;
pub use models::{
    DEFAULT_TOURNAMENT_NAME, Group, GroupFields, JUDGES_PER_MAT, JudgeMatchView, Mat,
    MatMatchView, Match, MatchFields, MatchUpdate, MatchView, NewTournament, PendingMatch,
    TournamentData, TournamentDocument, TournamentFields, TournamentId, TournamentSummary,
};
