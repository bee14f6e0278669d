//! http_listener source
//!
//! Receives events over HTTP: a POST to the configured ingest path carries
//! either a JSON body (array, object, or string) or raw text, one event per
//! item. The queue still back-pressures the caller: a full queue answers 429
//! instead of blocking the server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use observix_core::Event;
use observix_core::domain::pipeline::HttpListenerOptions;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::stats::PipelineStats;

use super::{PushOutcome, push_event};

pub struct HttpListenerSource {
    listener: TcpListener,
    path: String,
}

#[derive(Clone)]
struct IngestState {
    tx: mpsc::Sender<Event>,
    stats: Arc<PipelineStats>,
}

impl HttpListenerSource {
    pub async fn bind(options: &HttpListenerOptions) -> anyhow::Result<Self> {
        let addr = format!("{}:{}", options.host, options.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("bind http_listener source on {}", addr))?;

        let path = if options.path.starts_with('/') {
            options.path.clone()
        } else {
            format!("/{}", options.path)
        };

        debug!("http_listener source listening on {}{}", addr, path);
        Ok(Self { listener, path })
    }

    pub async fn run(
        self,
        tx: mpsc::Sender<Event>,
        stats: Arc<PipelineStats>,
        cancel: CancellationToken,
    ) {
        let app = Router::new()
            .route(&self.path, post(ingest))
            .route("/healthz", get(healthz))
            .with_state(IngestState { tx, stats });

        let serve = axum::serve(
            self.listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(cancel.cancelled_owned());

        if let Err(e) = serve.await {
            warn!("http_listener server error: {}", e);
        }

        debug!("http_listener source stopped");
    }
}

async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn ingest(
    State(state): State<IngestState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if body.is_empty() {
        return (StatusCode::BAD_REQUEST, "empty body").into_response();
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut events: Vec<Event> = Vec::new();
    if content_type.contains("application/json") {
        let payload: Value = match serde_json::from_slice(&body) {
            Ok(payload) => payload,
            Err(_) => return (StatusCode::BAD_REQUEST, "invalid json").into_response(),
        };
        match payload {
            Value::Array(items) => {
                events.extend(items.into_iter().filter_map(|item| event_from_item(item, peer)));
            }
            other => events.extend(event_from_item(other, peer)),
        }
    } else {
        let raw = String::from_utf8_lossy(&body).trim().to_string();
        if !raw.is_empty() {
            events.push(Event::from_peer(raw, peer.to_string()));
        }
    }

    let mut accepted = 0usize;
    for event in events {
        match push_event(&state.tx, &state.stats, event) {
            PushOutcome::Accepted => accepted += 1,
            // Full or closing queue: stop accepting the remainder.
            PushOutcome::Dropped | PushOutcome::Closed => break,
        }
    }

    if accepted == 0 {
        return (StatusCode::TOO_MANY_REQUESTS, "queue full").into_response();
    }

    (StatusCode::ACCEPTED, format!("accepted={}", accepted)).into_response()
}

/// Build one event from a JSON body item.
///
/// Objects take their `raw` field as the payload when it is a non-empty
/// string, otherwise the whole object serialized compactly; every other field
/// lands in `meta`.
fn event_from_item(item: Value, peer: SocketAddr) -> Option<Event> {
    match item {
        Value::String(s) => {
            let raw = s.trim().to_string();
            if raw.is_empty() {
                return None;
            }
            Some(Event::from_peer(raw, peer.to_string()))
        }
        Value::Object(map) => {
            let raw = match map.get("raw").and_then(Value::as_str) {
                Some(s) if !s.trim().is_empty() => s.trim().to_string(),
                _ => serde_json::to_string(&map).ok()?,
            };

            let mut event = Event::from_peer(raw, peer.to_string());
            for (key, value) in map {
                if key != "raw" {
                    event.meta.insert(key, value);
                }
            }
            Some(event)
        }
        other => {
            let raw = other.to_string();
            if raw.trim().is_empty() {
                return None;
            }
            Some(Event::from_peer(raw, peer.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "127.0.0.1:9999".parse().unwrap()
    }

    #[test]
    fn string_items_become_trimmed_events() {
        let event = event_from_item(json!("  hello  "), peer()).unwrap();
        assert_eq!(event.raw, "hello");
        assert_eq!(event.source_addr.as_deref(), Some("127.0.0.1:9999"));

        assert!(event_from_item(json!("   "), peer()).is_none());
    }

    #[test]
    fn objects_use_their_raw_field_and_keep_other_fields() {
        let event = event_from_item(json!({"raw": "payload", "level": "warn"}), peer()).unwrap();
        assert_eq!(event.raw, "payload");
        assert_eq!(event.meta["level"], json!("warn"));
        assert!(!event.meta.contains_key("raw"));
    }

    #[test]
    fn objects_without_raw_serialize_compactly() {
        let event = event_from_item(json!({"k": 1}), peer()).unwrap();
        assert_eq!(event.raw, r#"{"k":1}"#);
        assert_eq!(event.meta["k"], json!(1));
    }

    #[test]
    fn scalars_are_stringified() {
        let event = event_from_item(json!(42), peer()).unwrap();
        assert_eq!(event.raw, "42");
    }
}
