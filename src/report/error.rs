//! Report integrity and encoding errors.

use thiserror::Error;

/// Errors raised while building or encoding a summary report.
///
/// All of them are fatal to the run that produced the report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("stage '{0}' was already recorded")]
    DuplicateStage(String),

    #[error("report is missing required stages: {}", .missing.join(", "))]
    IncompleteReport { missing: Vec<String> },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_report_lists_missing() {
        let err = ReportError::IncompleteReport {
            missing: vec!["deploy".to_string(), "verify".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "report is missing required stages: deploy, verify"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ReportError = json_err.into();
        assert!(matches!(err, ReportError::Serialization(_)));
    }
}
