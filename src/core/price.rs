//! Price-source abstraction and raw observation types

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// A single daily close for one instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceObservation {
    pub date: NaiveDate,
    pub close: f64,
}

impl PriceObservation {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

impl From<(NaiveDate, f64)> for PriceObservation {
    fn from((date, close): (NaiveDate, f64)) -> Self {
        Self { date, close }
    }
}

/// Raw closes for one instrument, in whatever order the source returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub instrument: String,
    pub observations: Vec<PriceObservation>,
}

impl PriceSeries {
    pub fn new(instrument: impl Into<String>, observations: Vec<PriceObservation>) -> Self {
        Self {
            instrument: instrument.into(),
            observations,
        }
    }
}

/// External market-data collaborator.
///
/// The date range passed to `fetch_closes` is half-open: closes on `start`
/// are included, closes on `end` are not.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Returns whether the identifier is known to the source.
    async fn resolve(&self, instrument: &str) -> Result<bool>;

    async fn fetch_closes(
        &self,
        instrument: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceObservation>>;
}
