//! Pipeline sources
//!
//! A source owns the inbound listener and pushes events into the pipeline's
//! bounded queue. On a full queue the newest event is dropped and counted;
//! the receive loop never blocks on downstream pressure.

pub mod file_tail;
pub mod http;
pub mod syslog_udp;

use std::sync::Arc;

use observix_core::Event;
use observix_core::domain::pipeline::SourceSpec;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

use crate::stats::PipelineStats;
use file_tail::FileTailSource;
use http::HttpListenerSource;
use syslog_udp::SyslogUdpSource;

pub enum Source {
    SyslogUdp(SyslogUdpSource),
    FileTail(FileTailSource),
    HttpListener(HttpListenerSource),
}

impl Source {
    /// Acquire the listener for the configured source kind.
    ///
    /// Binding happens here so a port conflict fails pipeline startup instead
    /// of surfacing later inside the receive loop.
    pub async fn open(spec: &SourceSpec) -> anyhow::Result<Source> {
        match spec {
            SourceSpec::SyslogUdp { options } => {
                Ok(Source::SyslogUdp(SyslogUdpSource::bind(options).await?))
            }
            SourceSpec::FileTail { options } => {
                Ok(Source::FileTail(FileTailSource::open(options).await?))
            }
            SourceSpec::HttpListener { options } => {
                Ok(Source::HttpListener(HttpListenerSource::bind(options).await?))
            }
        }
    }

    /// Drive the receive loop until cancelled or the queue closes.
    pub async fn run(
        self,
        tx: mpsc::Sender<Event>,
        stats: Arc<PipelineStats>,
        cancel: CancellationToken,
    ) {
        match self {
            Source::SyslogUdp(source) => source.run(tx, stats, cancel).await,
            Source::FileTail(source) => source.run(tx, stats, cancel).await,
            Source::HttpListener(source) => source.run(tx, stats, cancel).await,
        }
    }
}

/// What happened to one pushed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PushOutcome {
    Accepted,
    /// Queue full: the newest event was dropped and counted.
    Dropped,
    /// Queue closed: the pipeline is shutting down; stop the source.
    Closed,
}

/// Push one event into the bounded queue, drop-tail on overflow.
pub(crate) fn push_event(
    tx: &mpsc::Sender<Event>,
    stats: &PipelineStats,
    event: Event,
) -> PushOutcome {
    // The slot is reserved before the push so the batcher's decrement can
    // never observe the gauge below zero.
    stats.record_enqueue();
    match tx.try_send(event) {
        Ok(()) => {
            stats.record_recv();
            PushOutcome::Accepted
        }
        Err(TrySendError::Full(_)) => {
            stats.record_drop_queue_full();
            PushOutcome::Dropped
        }
        Err(TrySendError::Closed(_)) => {
            stats.record_enqueue_abandoned();
            PushOutcome::Closed
        }
    }
}
