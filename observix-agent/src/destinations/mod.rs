//! Pipeline destinations
//!
//! A destination emits per-event records to the sink. Per-event send errors
//! do not abort the batch; the remainder is still attempted and the batch is
//! counted failed once.

pub mod file;
pub mod http;
pub mod syslog_udp;

use std::sync::Arc;

use observix_core::Event;
use observix_core::domain::pipeline::DestinationSpec;
use tokio::sync::mpsc;
use tracing::debug;

use crate::stats::PipelineStats;
use file::FileDestination;
use http::HttpDestination;
use syslog_udp::SyslogUdpDestination;

pub enum Destination {
    SyslogUdp(SyslogUdpDestination),
    File(FileDestination),
    Http(HttpDestination),
}

/// Result of one batch emission.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub delivered: u64,
    pub last_error: Option<String>,
}

impl Destination {
    pub async fn open(spec: &DestinationSpec) -> anyhow::Result<Destination> {
        match spec {
            DestinationSpec::SyslogUdp { options } => Ok(Destination::SyslogUdp(
                SyslogUdpDestination::open(options).await?,
            )),
            DestinationSpec::File { options } => {
                Ok(Destination::File(FileDestination::open(options).await?))
            }
            DestinationSpec::Http { options } => {
                Ok(Destination::Http(HttpDestination::new(options)))
            }
        }
    }

    pub async fn send(&mut self, batch: &[Event]) -> BatchOutcome {
        match self {
            Destination::SyslogUdp(dest) => dest.send(batch).await,
            Destination::File(dest) => dest.send(batch).await,
            Destination::Http(dest) => dest.send(batch).await,
        }
    }
}

/// Destination task: take each post-processor batch, emit it, account for it.
///
/// Exits when the batcher drops its side of the hand-off channel.
pub async fn run(
    mut destination: Destination,
    mut rx: mpsc::Receiver<Vec<Event>>,
    stats: Arc<PipelineStats>,
) {
    while let Some(batch) = rx.recv().await {
        let outcome = destination.send(&batch).await;

        stats.record_events_sent(outcome.delivered);
        match outcome.last_error {
            None => stats.record_batch_delivered(),
            Some(error) => stats.record_batch_failed(&error),
        }
    }

    debug!("destination stopped");
}
