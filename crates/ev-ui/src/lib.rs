//! Terminal UI layer for the EV dashboard.
//!
//! Provides themes, metric cards, charts, the searchable vehicle table and
//! the application event loop, all drawn with [`ratatui`].

pub mod app;
pub mod charts;
pub mod components;
pub mod table_view;
pub mod themes;

pub use ev_core as core;
