//! Shared types for the EV registration dashboard.
//!
//! Holds the vehicle record model, lenient cell parsing, number formatting,
//! the error type and the command-line settings used by the other crates.

pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
