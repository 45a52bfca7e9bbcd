//! Portfolio analytics engine

pub mod align;
pub mod config;
pub mod error;
pub mod log;
pub mod pipeline;
pub mod price;
pub mod returns;
pub mod stats;
pub mod validate;

// Re-export main types for cleaner imports
pub use align::AlignedPriceTable;
pub use error::AnalysisError;
pub use pipeline::{Analysis, analyze};
pub use price::{PriceObservation, PriceSeries, PriceSource};
pub use returns::ReturnTable;
pub use stats::PortfolioResult;
pub use validate::ValidatedConfig;
