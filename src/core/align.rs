//! Outer-join alignment of per-instrument closes onto one date index.

use crate::core::error::AnalysisError;
use crate::core::price::PriceSeries;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Closing prices on a shared, ascending date index.
///
/// `columns[i][t]` is the close of `instruments[i]` on `dates[t]`, or `None`
/// when that instrument was not observed on that date.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPriceTable {
    pub dates: Vec<NaiveDate>,
    pub instruments: Vec<String>,
    pub columns: Vec<Vec<Option<f64>>>,
}

impl AlignedPriceTable {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, instrument: &str) -> Option<&[Option<f64>]> {
        self.instruments
            .iter()
            .position(|i| i == instrument)
            .map(|idx| self.columns[idx].as_slice())
    }

    /// Prices of every instrument on row `t`, in column order.
    pub fn row(&self, t: usize) -> Vec<Option<f64>> {
        self.columns.iter().map(|col| col[t]).collect()
    }
}

/// Builds the union date index and places each instrument's closes on it.
///
/// Input order of observations is irrelevant. A date observed twice for the
/// same instrument is rejected rather than resolved.
pub fn align(series: &[PriceSeries]) -> Result<AlignedPriceTable, AnalysisError> {
    let mut by_instrument: Vec<BTreeMap<NaiveDate, f64>> = Vec::with_capacity(series.len());
    let mut all_dates = BTreeSet::new();

    for s in series {
        let mut closes = BTreeMap::new();
        for obs in &s.observations {
            if closes.insert(obs.date, obs.close).is_some() {
                return Err(AnalysisError::DuplicateObservation {
                    instrument: s.instrument.clone(),
                    date: obs.date,
                });
            }
            all_dates.insert(obs.date);
        }
        debug!("{} has {} observations", s.instrument, closes.len());
        by_instrument.push(closes);
    }

    let dates: Vec<NaiveDate> = all_dates.into_iter().collect();
    let columns = by_instrument
        .iter()
        .map(|closes| dates.iter().map(|d| closes.get(d).copied()).collect())
        .collect();

    debug!("Aligned {} instruments over {} dates", series.len(), dates.len());
    Ok(AlignedPriceTable {
        dates,
        instruments: series.iter().map(|s| s.instrument.clone()).collect(),
        columns,
    })
}
