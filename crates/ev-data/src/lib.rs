//! Data layer for the EV dashboard.
//!
//! Discovers and parses registration CSV files, computes fleet statistics,
//! filters rows for the vehicle table and runs the top-level analysis
//! pipeline.

pub mod aggregator;
pub mod analysis;
pub mod reader;
pub mod search;

pub use ev_core as core;
