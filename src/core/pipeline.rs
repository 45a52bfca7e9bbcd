//! Validate, fetch, align, compute returns and summarize, in that order.
use crate::core::align::{AlignedPriceTable, align};
use crate::core::config::PortfolioConfig;
use crate::core::error::AnalysisError;
use crate::core::price::{PriceSeries, PriceSource};
use crate::core::returns::{ReturnTable, compute_returns};
use crate::core::stats::{PortfolioResult, summarize};
use crate::core::validate::{ValidatedConfig, validate};
use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{debug, info};

/// Every artifact of one analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub config: ValidatedConfig,
    pub prices: AlignedPriceTable,
    pub returns: ReturnTable,
    pub result: PortfolioResult,
}

/// Runs a full analysis. Nothing is fetched unless the configuration is valid.
///
/// Instruments are fetched concurrently; results are gathered back in
/// configuration order. `update_callback` fires once per completed fetch.
pub async fn analyze(
    config: &PortfolioConfig,
    source: &(dyn PriceSource + Send + Sync),
    today: NaiveDate,
    update_callback: &(dyn Fn() + Sync),
) -> Result<Analysis, AnalysisError> {
    let config = validate(config, source, today).await?;
    info!(
        "Analyzing {} instruments from {} to {}",
        config.instruments().len(),
        config.start_date(),
        config.end_date()
    );

    let (start, end) = (config.start_date(), config.end_date());
    let futures = config.instruments().iter().map(|id| async move {
        let result = source.fetch_closes(id, start, end).await;
        update_callback();
        (id, result)
    });

    let mut series = Vec::with_capacity(config.instruments().len());
    for (id, result) in join_all(futures).await {
        let observations = result.map_err(|e| AnalysisError::PriceSource {
            instrument: id.clone(),
            message: e.to_string(),
        })?;
        debug!("Fetched {} closes for {}", observations.len(), id);
        series.push(PriceSeries::new(id.clone(), observations));
    }

    let prices = align(&series)?;
    let returns = compute_returns(&prices);
    let result = summarize(&returns, config.weights())?;

    Ok(Analysis {
        config,
        prices,
        returns,
        result,
    })
}
