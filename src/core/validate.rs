//! Up-front validation of a portfolio configuration.
//!
//! Checks run in a fixed order and the first failure wins. Only the
//! instrument existence check consults the price source; everything else is
//! a function of the configuration and the supplied `today`.

use crate::core::config::PortfolioConfig;
use crate::core::error::AnalysisError;
use crate::core::price::PriceSource;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::debug;

/// Maximum accepted distance between the weight sum and 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

// Absorbs the representation error of decimal weights such as 0.999999.
const ROUNDING_SLACK: f64 = 1e-12;

/// A configuration that passed every check. Only `validate` can build one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig(PortfolioConfig);

impl ValidatedConfig {
    pub fn instruments(&self) -> &[String] {
        &self.0.instruments
    }

    pub fn weights(&self) -> &[f64] {
        &self.0.weights
    }

    pub fn start_date(&self) -> NaiveDate {
        self.0.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.0.end_date
    }
}

pub async fn validate(
    config: &PortfolioConfig,
    source: &(dyn PriceSource + Send + Sync),
    today: NaiveDate,
) -> Result<ValidatedConfig, AnalysisError> {
    for instrument in &config.instruments {
        let known = source
            .resolve(instrument)
            .await
            .map_err(|e| AnalysisError::PriceSource {
                instrument: instrument.clone(),
                message: e.to_string(),
            })?;
        if !known {
            return Err(AnalysisError::UnknownInstrument(instrument.clone()));
        }
        debug!("Resolved instrument {}", instrument);
    }

    check_weights(config)?;
    check_dates(config, today)?;

    let mut seen = HashSet::new();
    if let Some(dup) = config.instruments.iter().find(|i| !seen.insert(i.as_str())) {
        return Err(AnalysisError::DuplicateInstrument(dup.clone()));
    }

    Ok(ValidatedConfig(config.clone()))
}

fn check_weights(config: &PortfolioConfig) -> Result<(), AnalysisError> {
    if config.instruments.len() != config.weights.len() {
        return Err(AnalysisError::WeightCountMismatch {
            instruments: config.instruments.len(),
            weights: config.weights.len(),
        });
    }

    let sum: f64 = config.weights.iter().sum();
    // Written so that a NaN sum is rejected.
    if !((sum - 1.0).abs() <= WEIGHT_SUM_TOLERANCE + ROUNDING_SLACK) {
        return Err(AnalysisError::WeightsDoNotSumToOne(sum));
    }
    Ok(())
}

fn check_dates(config: &PortfolioConfig, today: NaiveDate) -> Result<(), AnalysisError> {
    if config.start_date > config.end_date {
        return Err(AnalysisError::InvertedDateRange {
            start: config.start_date,
            end: config.end_date,
        });
    }
    if config.end_date >= today {
        return Err(AnalysisError::EndDateNotInPast {
            end: config.end_date,
            today,
        });
    }
    Ok(())
}
