//! Data models for simulation runs.
//!
//! This module contains the core data structures shared by every pipeline:
//! stage results, the execution log, and the finalized summary report.

use crate::report::ReportError;
use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Category attached to every execution log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogCategory {
    Info,
    Init,
    Success,
    Integration,
    Enhancement,
    Deployment,
    Demo,
    Report,
    Phase,
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogCategory::Info => "INFO",
            LogCategory::Init => "INIT",
            LogCategory::Success => "SUCCESS",
            LogCategory::Integration => "INTEGRATION",
            LogCategory::Enhancement => "ENHANCEMENT",
            LogCategory::Deployment => "DEPLOYMENT",
            LogCategory::Demo => "DEMO",
            LogCategory::Report => "REPORT",
            LogCategory::Phase => "PHASE",
        };
        write!(f, "{}", label)
    }
}

/// Result produced by a single pipeline stage.
///
/// Always a JSON object. Field order is the order the stage wrote them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageResult(Map<String, Value>);

impl StageResult {
    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, ReportError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(ReportError::Serialization(format!(
                "stage result must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Serialize any value into a stage result.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, ReportError> {
        Self::from_value(serde_json::to_value(value)?)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a string field, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns an unsigned integer field, if present and integral.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Convert a float to a JSON number, rejecting NaN and infinities.
///
/// JSON has no representation for non-finite numbers and `serde_json`
/// would otherwise silently turn them into `null`.
pub fn finite(value: f64) -> Result<Value, ReportError> {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| ReportError::Serialization(format!("non-finite number: {}", value)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A single timestamped narration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub category: LogCategory,
    pub message: String,
}

/// Ordered, append-only record of narration produced during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionLog {
    entries: Vec<LogEntry>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry stamped with the current time.
    pub fn append(&mut self, category: LogCategory, message: impl Into<String>) {
        self.entries.push(LogEntry {
            timestamp: Utc::now(),
            category,
            message: message.into(),
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stage results keyed by stage name, in the order they were recorded.
///
/// Serialized as a JSON object. Deserialization keeps document order and
/// rejects repeated keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageMap {
    entries: Vec<(String, StageResult)>,
}

impl StageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == name)
    }

    /// Insert a new entry. Returns the name back if it is already taken.
    pub fn insert(&mut self, name: String, result: StageResult) -> Result<(), String> {
        if self.contains(&name) {
            return Err(name);
        }
        self.entries.push((name, result));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&StageResult> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, result)| result)
    }

    /// Stage names in recording order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StageResult)> {
        self.entries.iter().map(|(name, result)| (name.as_str(), result))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for StageMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, result) in &self.entries {
            map.serialize_entry(name, result)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StageMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StageMapVisitor;

        impl<'de> Visitor<'de> for StageMapVisitor {
            type Value = StageMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of stage names to stage results")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<StageMap, A::Error> {
                let mut stages = StageMap::new();
                while let Some((name, result)) = access.next_entry::<String, StageResult>()? {
                    stages.insert(name, result).map_err(|name| {
                        serde::de::Error::custom(format!("duplicate stage '{}'", name))
                    })?;
                }
                Ok(stages)
            }
        }

        deserializer.deserialize_map(StageMapVisitor)
    }
}

/// Derived aggregate fields describing a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Name of the pipeline that produced the report.
    pub pipeline: String,
    /// Cosmetic run identifier.
    pub run_id: String,
    /// When the aggregator was created.
    pub started_at: DateTime<Utc>,
    /// When the report was finalized.
    pub finished_at: DateTime<Utc>,
    /// Wall-clock time between creation and finalization.
    pub elapsed_ms: u64,
    /// Number of recorded stages.
    pub stage_count: usize,
    /// Number of execution log entries.
    pub log_entries: usize,
}

/// The finalized, immutable record of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    metadata: ReportMetadata,
    stages: StageMap,
    execution_log: ExecutionLog,
}

impl SummaryReport {
    pub(crate) fn new(
        metadata: ReportMetadata,
        stages: StageMap,
        execution_log: ExecutionLog,
    ) -> Self {
        Self {
            metadata,
            stages,
            execution_log,
        }
    }

    pub fn metadata(&self) -> &ReportMetadata {
        &self.metadata
    }

    pub fn stages(&self) -> &StageMap {
        &self.stages
    }

    pub fn stage(&self, name: &str) -> Option<&StageResult> {
        self.stages.get(name)
    }

    pub fn execution_log(&self) -> &ExecutionLog {
        &self.execution_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stage_result_requires_object() {
        assert!(StageResult::from_value(json!({"status": "ok"})).is_ok());

        let err = StageResult::from_value(json!([1, 2, 3])).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_stage_result_from_serialize() {
        #[derive(Serialize)]
        struct Pool {
            name: &'static str,
            count: u32,
        }

        let result = StageResult::from_serialize(&Pool {
            name: "aipool",
            count: 5,
        })
        .unwrap();
        assert_eq!(result.get_str("name"), Some("aipool"));
        assert_eq!(result.get_u64("count"), Some(5));
    }

    #[test]
    fn test_stage_result_keeps_field_order() {
        let result = StageResult::from_value(json!({"zeta": 1, "alpha": 2, "mid": 3})).unwrap();
        let keys: Vec<_> = result.fields().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_finite_rejects_infinity() {
        assert!(finite(22026.465).is_ok());
        assert!(finite(f64::INFINITY).is_err());
        assert!(finite(f64::NAN).is_err());
    }

    #[test]
    fn test_log_category_display() {
        assert_eq!(LogCategory::Success.to_string(), "SUCCESS");
        assert_eq!(
            serde_json::to_string(&LogCategory::Deployment).unwrap(),
            "\"DEPLOYMENT\""
        );
    }

    #[test]
    fn test_execution_log_appends_in_order() {
        let mut log = ExecutionLog::new();
        log.append(LogCategory::Init, "first");
        log.append(LogCategory::Success, "second");

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].message, "first");
        assert_eq!(log.entries()[1].category, LogCategory::Success);
        assert!(log.entries()[0].timestamp <= log.entries()[1].timestamp);
    }

    #[test]
    fn test_stage_map_rejects_duplicates() {
        let mut stages = StageMap::new();
        assert!(stages.insert("init".into(), StageResult::default()).is_ok());
        assert_eq!(
            stages.insert("init".into(), StageResult::default()),
            Err("init".to_string())
        );
        assert_eq!(stages.len(), 1);
    }

    #[test]
    fn test_stage_map_deserialize_rejects_duplicate_keys() {
        let raw = r#"{"init": {"a": 1}, "init": {"a": 2}}"#;
        let err = serde_json::from_str::<StageMap>(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate stage 'init'"));
    }

    #[test]
    fn test_stage_map_deserialize_keeps_document_order() {
        let raw = r#"{"deploy": {}, "init": {}, "finalize": {}}"#;
        let stages: StageMap = serde_json::from_str(raw).unwrap();
        let names: Vec<_> = stages.names().collect();
        assert_eq!(names, vec!["deploy", "init", "finalize"]);
    }
}
