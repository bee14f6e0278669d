//! Pipeline domain types
//!
//! The declarative pipeline description shared between the control plane
//! (persists) and the agent (runs). Source/processor/destination kinds are
//! modeled as tagged variants so an unknown kind fails at deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Pipeline record as stored by the control plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub pipeline_id: Uuid,
    pub name: String,
    pub enabled: bool,
    pub version: i64,
    pub spec: PipelineSpec,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Declarative description of one pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub source: SourceSpec,
    #[serde(default)]
    pub processor: ProcessorSpec,
    pub destination: DestinationSpec,
    #[serde(default = "default_batch_max_events")]
    pub batch_max_events: usize,
    #[serde(default = "default_batch_max_seconds")]
    pub batch_max_seconds: f64,
}

/// Inbound side of a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceSpec {
    SyslogUdp { options: SyslogUdpSourceOptions },
    FileTail { options: FileTailOptions },
    HttpListener { options: HttpListenerOptions },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyslogUdpSourceOptions {
    #[serde(default = "default_bind_host")]
    pub host: String,
    pub port: u16,
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileTailOptions {
    pub path: String,
    #[serde(default)]
    pub from_start: bool,
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpListenerOptions {
    #[serde(default = "default_bind_host")]
    pub host: String,
    pub port: u16,
    #[serde(default = "default_ingest_path")]
    pub path: String,
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,
}

/// Transformation applied to each batch before it reaches the destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProcessorSpec {
    #[default]
    Raw,
    Indexed { options: IndexedOptions },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedOptions {
    pub indexer_url: String,
    pub profile: String,
    #[serde(default = "default_indexer_timeout")]
    pub timeout_seconds: f64,
    #[serde(default = "default_true")]
    pub fallback_to_raw: bool,
}

/// Outbound side of a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DestinationSpec {
    SyslogUdp { options: SyslogUdpDestOptions },
    File { options: FileDestOptions },
    Http { options: HttpDestOptions },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyslogUdpDestOptions {
    pub host: String,
    #[serde(default = "default_syslog_port")]
    pub port: u16,
    #[serde(default = "default_pri")]
    pub pri: u8,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default = "default_appname")]
    pub appname: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDestOptions {
    pub path: String,
    #[serde(default)]
    pub format: FileFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    #[default]
    Raw,
    Jsonl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpDestOptions {
    pub url: String,
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: f64,
}

/// Spec invariant violation, surfaced to callers as `invalid_spec`.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("batch_max_events must be at least 1")]
    BatchMaxEvents,
    #[error("batch_max_seconds must be greater than zero")]
    BatchMaxSeconds,
    #[error("max_queue_size must be at least 1")]
    MaxQueueSize,
    #[error("indexed processor requires a non-empty {0}")]
    MissingIndexedOption(&'static str),
}

impl PipelineSpec {
    /// Enforce the invariants that tagged deserialization cannot express.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.batch_max_events < 1 {
            return Err(SpecError::BatchMaxEvents);
        }
        if !(self.batch_max_seconds > 0.0) {
            return Err(SpecError::BatchMaxSeconds);
        }

        let queue = match &self.source {
            SourceSpec::SyslogUdp { options } => options.max_queue_size,
            SourceSpec::FileTail { options } => options.max_queue_size,
            SourceSpec::HttpListener { options } => options.max_queue_size,
        };
        if queue < 1 {
            return Err(SpecError::MaxQueueSize);
        }

        if let ProcessorSpec::Indexed { options } = &self.processor {
            if options.indexer_url.trim().is_empty() {
                return Err(SpecError::MissingIndexedOption("indexer_url"));
            }
            if options.profile.trim().is_empty() {
                return Err(SpecError::MissingIndexedOption("profile"));
            }
            if !(options.timeout_seconds > 0.0) {
                return Err(SpecError::MissingIndexedOption("timeout_seconds"));
            }
        }

        Ok(())
    }
}

fn default_batch_max_events() -> usize {
    200
}

fn default_batch_max_seconds() -> f64 {
    1.0
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_max_queue_size() -> usize {
    50_000
}

fn default_ingest_path() -> String {
    "/ingest".to_string()
}

fn default_indexer_timeout() -> f64 {
    3.0
}

fn default_true() -> bool {
    true
}

fn default_syslog_port() -> u16 {
    514
}

fn default_pri() -> u8 {
    13
}

fn default_appname() -> String {
    "observix".to_string()
}

fn default_http_timeout() -> f64 {
    5.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_spec_json() -> serde_json::Value {
        serde_json::json!({
            "source": {"type": "syslog_udp", "options": {"port": 15514}},
            "destination": {"type": "syslog_udp", "options": {"host": "127.0.0.1", "port": 15515}}
        })
    }

    #[test]
    fn minimal_spec_applies_defaults() {
        let spec: PipelineSpec = serde_json::from_value(minimal_spec_json()).unwrap();

        assert_eq!(spec.batch_max_events, 200);
        assert_eq!(spec.batch_max_seconds, 1.0);
        assert_eq!(spec.processor, ProcessorSpec::Raw);

        match &spec.source {
            SourceSpec::SyslogUdp { options } => {
                assert_eq!(options.host, "0.0.0.0");
                assert_eq!(options.port, 15514);
                assert_eq!(options.max_queue_size, 50_000);
            }
            other => panic!("unexpected source: {other:?}"),
        }

        spec.validate().unwrap();
    }

    #[test]
    fn http_listener_source_applies_defaults() {
        let spec: PipelineSpec = serde_json::from_value(serde_json::json!({
            "source": {"type": "http_listener", "options": {"port": 15580}},
            "destination": {"type": "file", "options": {"path": "/tmp/out.log"}}
        }))
        .unwrap();

        match &spec.source {
            SourceSpec::HttpListener { options } => {
                assert_eq!(options.host, "0.0.0.0");
                assert_eq!(options.port, 15580);
                assert_eq!(options.path, "/ingest");
                assert_eq!(options.max_queue_size, 50_000);
            }
            other => panic!("unexpected source: {other:?}"),
        }

        spec.validate().unwrap();
    }

    #[test]
    fn unknown_source_kind_is_rejected() {
        let result: Result<PipelineSpec, _> = serde_json::from_value(serde_json::json!({
            "source": {"type": "carrier_pigeon", "options": {}},
            "destination": {"type": "file", "options": {"path": "/tmp/out.log"}}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn raw_processor_tolerates_empty_options() {
        let mut json = minimal_spec_json();
        json["processor"] = serde_json::json!({"mode": "raw", "options": {}});
        let spec: PipelineSpec = serde_json::from_value(json).unwrap();
        assert_eq!(spec.processor, ProcessorSpec::Raw);
    }

    #[test]
    fn indexed_processor_requires_url_and_profile() {
        let mut json = minimal_spec_json();
        json["processor"] = serde_json::json!({
            "mode": "indexed",
            "options": {"indexer_url": "http://127.0.0.1:7100", "profile": "json_auto"}
        });
        let spec: PipelineSpec = serde_json::from_value(json).unwrap();
        spec.validate().unwrap();

        match &spec.processor {
            ProcessorSpec::Indexed { options } => {
                assert_eq!(options.timeout_seconds, 3.0);
                assert!(options.fallback_to_raw);
            }
            other => panic!("unexpected processor: {other:?}"),
        }

        let mut bad = minimal_spec_json();
        bad["processor"] = serde_json::json!({
            "mode": "indexed",
            "options": {"indexer_url": "  ", "profile": "json_auto"}
        });
        let spec: PipelineSpec = serde_json::from_value(bad).unwrap();
        assert!(matches!(
            spec.validate(),
            Err(SpecError::MissingIndexedOption("indexer_url"))
        ));
    }

    #[test]
    fn batch_invariants_are_enforced() {
        let mut json = minimal_spec_json();
        json["batch_max_events"] = serde_json::json!(0);
        let spec: PipelineSpec = serde_json::from_value(json).unwrap();
        assert!(matches!(spec.validate(), Err(SpecError::BatchMaxEvents)));

        let mut json = minimal_spec_json();
        json["batch_max_seconds"] = serde_json::json!(0.0);
        let spec: PipelineSpec = serde_json::from_value(json).unwrap();
        assert!(matches!(spec.validate(), Err(SpecError::BatchMaxSeconds)));
    }

    #[test]
    fn spec_round_trip_is_stable() {
        let mut json = minimal_spec_json();
        json["processor"] = serde_json::json!({
            "mode": "indexed",
            "options": {"indexer_url": "http://127.0.0.1:7100", "profile": "kv_pairs"}
        });
        let spec: PipelineSpec = serde_json::from_value(json).unwrap();
        let encoded = serde_json::to_string(&spec).unwrap();
        let back: PipelineSpec = serde_json::from_str(&encoded).unwrap();
        assert_eq!(back, spec);
        // Re-encoding must be byte-identical: the control plane relies on it
        // to detect no-op updates.
        assert_eq!(serde_json::to_string(&back).unwrap(), encoded);
    }
}
