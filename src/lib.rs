//! Topic Evolution API
//!
//! Serves pre-computed LDA topic models and the comparisons between their
//! snapshots:
//! - term rankings of selected topics
//! - novel topics of a snapshot relative to its predecessor
//! - one-level evolution graphs between two snapshots
//! - scoring of free text against a stored model

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
