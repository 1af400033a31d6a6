//! Simulated pipelines.
//!
//! Each pipeline narrates a fictitious deployment and records its stage
//! results into a [`ReportAggregator`](crate::report::ReportAggregator).

pub mod azure;
pub mod cancel;
pub mod continuous;
pub mod gcp;
pub mod ids;
pub mod narrator;
pub mod nexus;
pub mod orchestrator;

pub use cancel::CancellationToken;
pub use ids::{IdSource, RandomIds};
pub use narrator::{Narrator, PacingConfig};

use crate::models::{StageResult, SummaryReport};
use crate::report::{AggregatorConfig, ReportAggregator};

/// Everything a pipeline needs besides its own data.
pub struct SimContext {
    pub narrator: Narrator,
    pub ids: Box<dyn IdSource>,
    /// Refuse to finalize reports with missing stages.
    pub enforce_required: bool,
}

impl SimContext {
    pub fn new(narrator: Narrator, ids: Box<dyn IdSource>) -> Self {
        Self {
            narrator,
            ids,
            enforce_required: true,
        }
    }

    /// Create an aggregator for `pipeline` expecting `stages`.
    pub fn aggregator(&mut self, pipeline: &str, stages: &[&str]) -> ReportAggregator {
        let run_id = ids::run_id(self.ids.as_mut());
        let mut config = AggregatorConfig::new(pipeline, run_id);
        if self.enforce_required {
            config = config.require(stages.iter().copied());
        }
        ReportAggregator::new(config)
    }

    /// A context that prints nothing, never pauses, and replays `values` as ids.
    #[cfg(test)]
    pub fn scripted(values: Vec<u64>) -> Self {
        Self::new(Narrator::silent(), Box::new(ids::ScriptedIds::new(values)))
    }
}

/// A cloud deployment's per-resource report plus its headline summary.
#[derive(Debug, Clone)]
pub struct DeploymentOutcome {
    pub report: SummaryReport,
    pub summary: StageResult,
}
