//! Presentation layer: terminal report, CSV export and config bootstrap.

pub mod analyze;
pub mod export;
pub mod setup;
pub mod ui;
