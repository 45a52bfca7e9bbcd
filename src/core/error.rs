//! Error taxonomy of the analytics engine.

use chrono::NaiveDate;
use thiserror::Error;

/// Every way an analysis run can fail. All variants are terminal for the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("Weight count mismatch: {instruments} instruments but {weights} weights")]
    WeightCountMismatch { instruments: usize, weights: usize },

    #[error("Weights must sum to 1.0, got {0}")]
    WeightsDoNotSumToOne(f64),

    #[error("Start date {start} is after end date {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    #[error("End date {end} must be before today ({today})")]
    EndDateNotInPast { end: NaiveDate, today: NaiveDate },

    #[error("Instrument listed more than once: {0}")]
    DuplicateInstrument(String),

    #[error("Duplicate observation for {instrument} on {date}")]
    DuplicateObservation { instrument: String, date: NaiveDate },

    #[error("Not enough return rows to estimate covariance: {rows}")]
    InsufficientData { rows: usize },

    #[error("Portfolio variance is negative: {0}")]
    NegativeVariance(f64),

    #[error("Price source failed for {instrument}: {message}")]
    PriceSource { instrument: String, message: String },
}
