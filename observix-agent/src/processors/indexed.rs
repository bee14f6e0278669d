//! indexed processor
//!
//! POSTs a batch's raw lines to the indexer and maps the returned documents
//! back into events: `raw` stays the event payload, every other top-level
//! field lands in `meta`.

use std::time::Duration;

use observix_core::Event;
use observix_core::domain::pipeline::IndexedOptions;
use observix_core::dto::normalize::NormalizeResponse;
use serde_json::json;

use super::ProcessorError;

const NORMALIZE_PATH: &str = "/v1/normalize";

pub struct IndexedProcessor {
    client: reqwest::Client,
    normalize_url: String,
    profile: String,
    timeout_seconds: f64,
    fallback_to_raw: bool,
}

impl IndexedProcessor {
    pub fn new(options: &IndexedOptions) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs_f64(options.timeout_seconds))
            .build()
            .unwrap_or_default();

        Self {
            client,
            normalize_url: normalize_url(&options.indexer_url),
            profile: options.profile.clone(),
            timeout_seconds: options.timeout_seconds,
            fallback_to_raw: options.fallback_to_raw,
        }
    }

    pub fn fallback_to_raw(&self) -> bool {
        self.fallback_to_raw
    }

    pub async fn process(&self, batch: &[Event]) -> Result<Vec<Event>, ProcessorError> {
        let lines: Vec<&str> = batch.iter().map(|event| event.raw.as_str()).collect();

        let response = self
            .client
            .post(&self.normalize_url)
            .json(&json!({ "profile": self.profile, "raw": lines }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProcessorError::IndexerTimeout(self.timeout_seconds)
                } else {
                    ProcessorError::IndexerUnavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ProcessorError::IndexerUnavailable(format!(
                "status {}",
                response.status()
            )));
        }

        let body: NormalizeResponse = response
            .json()
            .await
            .map_err(|e| ProcessorError::IndexerMalformed(e.to_string()))?;

        if body.docs.is_empty() {
            return Err(ProcessorError::IndexerMalformed(
                "no documents returned".to_string(),
            ));
        }

        // When the indexer returned exactly one doc per line, each event
        // keeps its original timestamp and peer; otherwise (multi-line
        // splits) fresh receive-time events are built.
        let aligned = body.docs.len() == batch.len();

        let mut events = Vec::with_capacity(body.docs.len());
        for (index, mut doc) in body.docs.into_iter().enumerate() {
            let raw = match doc.remove("raw") {
                Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s,
                _ => {
                    return Err(ProcessorError::IndexerMalformed(
                        "document missing non-empty raw".to_string(),
                    ));
                }
            };

            let mut event = if aligned {
                let original = &batch[index];
                Event {
                    ts: original.ts,
                    raw,
                    source_addr: original.source_addr.clone(),
                    meta: original.meta.clone(),
                }
            } else {
                Event::now(raw)
            };

            for (key, value) in doc {
                event.meta.insert(key, value);
            }
            events.push(event);
        }

        Ok(events)
    }
}

/// Normalize the configured indexer URL so it ends with exactly one
/// `/v1/normalize`, whether the operator supplied the base or the full path.
fn normalize_url(indexer_url: &str) -> String {
    let mut base = indexer_url.trim().trim_end_matches('/');
    while let Some(stripped) = base.strip_suffix(NORMALIZE_PATH) {
        base = stripped.trim_end_matches('/');
    }
    format!("{}{}", base, NORMALIZE_PATH)
}
