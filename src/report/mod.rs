//! Report aggregation and rendering.

pub mod aggregator;
pub mod error;
pub mod generator;

pub use aggregator::{AggregatorConfig, ReportAggregator};
pub use error::ReportError;
pub use generator::*;
