use crate::core::price::{PriceObservation, PriceSource};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Deterministic in-memory price source.
///
/// Observations are returned exactly as registered (order and duplicates
/// included), filtered to the requested `[start, end)` range.
#[derive(Debug, Default)]
pub struct MemoryPriceSource {
    series: HashMap<String, Vec<PriceObservation>>,
    resolve_errors: HashMap<String, String>,
    fetch_errors: HashMap<String, String>,
    fetches: AtomicUsize,
}

impl MemoryPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series<I, O>(mut self, instrument: &str, observations: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<PriceObservation>,
    {
        self.series.insert(
            instrument.to_string(),
            observations.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Makes `resolve` fail for `instrument`.
    pub fn failing(mut self, instrument: &str, message: &str) -> Self {
        self.resolve_errors
            .insert(instrument.to_string(), message.to_string());
        self
    }

    /// Makes `fetch_closes` fail for `instrument`.
    pub fn failing_fetch(mut self, instrument: &str, message: &str) -> Self {
        self.fetch_errors
            .insert(instrument.to_string(), message.to_string());
        self
    }

    /// Number of `fetch_closes` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for MemoryPriceSource {
    async fn resolve(&self, instrument: &str) -> Result<bool> {
        if let Some(message) = self.resolve_errors.get(instrument) {
            return Err(anyhow!(message.clone()));
        }
        Ok(self.series.contains_key(instrument))
    }

    async fn fetch_closes(
        &self,
        instrument: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceObservation>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fetch_errors.get(instrument) {
            return Err(anyhow!(message.clone()));
        }
        let observations = self
            .series
            .get(instrument)
            .ok_or_else(|| anyhow!("No price data found for symbol: {}", instrument))?;

        let closes: Vec<PriceObservation> = observations
            .iter()
            .filter(|obs| obs.date >= start && obs.date < end)
            .copied()
            .collect();
        debug!("Serving {} closes for {}", closes.len(), instrument);
        Ok(closes)
    }
}
