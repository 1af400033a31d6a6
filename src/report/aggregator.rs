//! Stage result aggregation.
//!
//! A [`ReportAggregator`] collects the results of an ordered sequence of
//! stages together with the run's execution log, then folds them into a
//! single immutable [`SummaryReport`].

use crate::models::{
    ExecutionLog, LogCategory, ReportMetadata, StageMap, StageResult, SummaryReport,
};
use crate::report::ReportError;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use tracing::debug;

/// Explicit per-run configuration for an aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorConfig {
    /// Name of the pipeline being aggregated.
    pub pipeline: String,
    /// Cosmetic run identifier.
    pub run_id: String,
    /// Stages that must be recorded before the report can be finalized.
    pub required_stages: Vec<String>,
}

impl AggregatorConfig {
    pub fn new(pipeline: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            pipeline: pipeline.into(),
            run_id: run_id.into(),
            required_stages: Vec::new(),
        }
    }

    /// Add required stage names, keeping their order.
    pub fn require<I, S>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_stages
            .extend(stages.into_iter().map(Into::into));
        self
    }
}

/// Collects stage results for one run.
#[derive(Debug)]
pub struct ReportAggregator {
    config: AggregatorConfig,
    started: Instant,
    started_at: DateTime<Utc>,
    stages: StageMap,
    log: ExecutionLog,
}

impl ReportAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        debug!(
            "Starting aggregator for pipeline '{}' (run {})",
            config.pipeline, config.run_id
        );

        Self {
            config,
            started: Instant::now(),
            started_at: Utc::now(),
            stages: StageMap::new(),
            log: ExecutionLog::new(),
        }
    }

    /// Store `result` under `stage_name`, after every previously recorded stage.
    pub fn record(
        &mut self,
        stage_name: impl Into<String>,
        result: StageResult,
    ) -> Result<(), ReportError> {
        let stage_name = stage_name.into();
        debug!("Recording stage '{}' ({} fields)", stage_name, result.len());
        self.stages
            .insert(stage_name, result)
            .map_err(ReportError::DuplicateStage)
    }

    /// Append a narration record to the execution log.
    pub fn log(&mut self, category: LogCategory, message: impl Into<String>) {
        self.log.append(category, message);
    }

    /// Wall-clock time since the aggregator was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn stage(&self, name: &str) -> Option<&StageResult> {
        self.stages.get(name)
    }

    /// Required stages not recorded yet, in configured order.
    pub fn missing_stages(&self) -> Vec<String> {
        self.config
            .required_stages
            .iter()
            .filter(|name| !self.stages.contains(name))
            .cloned()
            .collect()
    }

    /// Build the immutable summary report.
    pub fn finalize(self) -> Result<SummaryReport, ReportError> {
        let missing = self.missing_stages();
        if !missing.is_empty() {
            return Err(ReportError::IncompleteReport { missing });
        }

        let elapsed_ms = u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX);
        let metadata = ReportMetadata {
            pipeline: self.config.pipeline,
            run_id: self.config.run_id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            elapsed_ms,
            stage_count: self.stages.len(),
            log_entries: self.log.len(),
        };

        debug!(
            "Finalized '{}' report: {} stages, {} log entries",
            metadata.pipeline, metadata.stage_count, metadata.log_entries
        );

        Ok(SummaryReport::new(metadata, self.stages, self.log))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stage(value: serde_json::Value) -> StageResult {
        StageResult::from_value(value).unwrap()
    }

    fn three_stage_config() -> AggregatorConfig {
        AggregatorConfig::new("test", "run-0001").require(["init", "deploy", "finalize"])
    }

    #[test]
    fn test_record_then_finalize_keeps_insertion_order() {
        let mut aggregator = ReportAggregator::new(three_stage_config());
        aggregator.record("init", stage(json!({"status": "ok"}))).unwrap();
        aggregator.record("deploy", stage(json!({"resources": 3}))).unwrap();
        aggregator
            .record("finalize", stage(json!({"status": "complete"})))
            .unwrap();

        assert!(aggregator.elapsed() >= Duration::ZERO);

        let report = aggregator.finalize().unwrap();
        let names: Vec<_> = report.stages().names().collect();
        assert_eq!(names, vec!["init", "deploy", "finalize"]);
        assert_eq!(report.metadata().stage_count, 3);
        assert_eq!(report.stage("deploy").unwrap().get_u64("resources"), Some(3));
        assert_eq!(
            report.stage("finalize").unwrap().get_str("status"),
            Some("complete")
        );
    }

    #[test]
    fn test_duplicate_stage_is_rejected() {
        let mut aggregator = ReportAggregator::new(AggregatorConfig::new("test", "run"));
        aggregator.record("init", stage(json!({"status": "ok"}))).unwrap();

        let err = aggregator
            .record("init", stage(json!({"status": "again"})))
            .unwrap_err();
        assert!(matches!(err, ReportError::DuplicateStage(ref name) if name == "init"));

        // The first result is untouched.
        assert_eq!(aggregator.stage("init").unwrap().get_str("status"), Some("ok"));
    }

    #[test]
    fn test_finalize_fails_when_required_stage_missing() {
        let mut aggregator = ReportAggregator::new(three_stage_config());
        aggregator.record("init", stage(json!({"status": "ok"}))).unwrap();
        aggregator
            .record("finalize", stage(json!({"status": "complete"})))
            .unwrap();

        match aggregator.finalize() {
            Err(ReportError::IncompleteReport { missing }) => {
                assert_eq!(missing, vec!["deploy".to_string()]);
            }
            other => panic!("expected IncompleteReport, got {:?}", other),
        }
    }

    #[test]
    fn test_unrequired_stages_are_allowed() {
        let mut aggregator =
            ReportAggregator::new(AggregatorConfig::new("test", "run").require(["init"]));
        aggregator.record("init", stage(json!({}))).unwrap();
        aggregator.record("extra", stage(json!({"note": "bonus"}))).unwrap();

        let report = aggregator.finalize().unwrap();
        assert_eq!(report.stages().len(), 2);
    }

    #[test]
    fn test_missing_stages_in_configured_order() {
        let aggregator = ReportAggregator::new(three_stage_config());
        assert_eq!(
            aggregator.missing_stages(),
            vec!["init", "deploy", "finalize"]
        );
    }

    #[test]
    fn test_log_entries_carry_into_report() {
        let mut aggregator = ReportAggregator::new(AggregatorConfig::new("test", "run"));
        aggregator.log(LogCategory::Phase, "PHASE 1: Initializing all systems");
        aggregator.log(LogCategory::Success, "done");

        let report = aggregator.finalize().unwrap();
        assert_eq!(report.metadata().log_entries, 2);
        assert_eq!(
            report.execution_log().entries()[0].message,
            "PHASE 1: Initializing all systems"
        );
    }

    #[test]
    fn test_metadata_timestamps_are_ordered() {
        let aggregator = ReportAggregator::new(AggregatorConfig::new("test", "run-42"));
        let report = aggregator.finalize().unwrap();

        let metadata = report.metadata();
        assert_eq!(metadata.run_id, "run-42");
        assert!(metadata.started_at <= metadata.finished_at);
    }
}
