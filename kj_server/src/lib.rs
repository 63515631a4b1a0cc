//! HTTP server for judo kata tournaments.
//!
//! Serves the organizer console, the mat displays and the judges' tablets
//! over a JSON API backed by [`kata_judge`].

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
