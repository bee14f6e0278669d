//! syslog_udp source
//!
//! Binds a UDP socket and turns each datagram into one event with the peer
//! address recorded under `source_addr`.

use std::sync::Arc;

use anyhow::Context;
use observix_core::Event;
use observix_core::domain::pipeline::SyslogUdpSourceOptions;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::stats::PipelineStats;

use super::{PushOutcome, push_event};

pub struct SyslogUdpSource {
    socket: UdpSocket,
}

impl SyslogUdpSource {
    pub async fn bind(options: &SyslogUdpSourceOptions) -> anyhow::Result<Self> {
        let addr = format!("{}:{}", options.host, options.port);
        let socket = UdpSocket::bind(&addr)
            .await
            .with_context(|| format!("bind syslog_udp source on {}", addr))?;
        debug!("syslog_udp source listening on {}", addr);
        Ok(Self { socket })
    }

    pub async fn run(
        self,
        tx: mpsc::Sender<Event>,
        stats: Arc<PipelineStats>,
        cancel: CancellationToken,
    ) {
        let mut buf = vec![0u8; 65_535];

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.socket.recv_from(&mut buf) => {
                    let (len, peer) = match result {
                        Ok(received) => received,
                        Err(e) => {
                            warn!("syslog_udp receive error: {}", e);
                            continue;
                        }
                    };

                    let raw = String::from_utf8_lossy(&buf[..len]).trim().to_string();
                    if raw.is_empty() {
                        continue;
                    }

                    let event = Event::from_peer(raw, peer.to_string());
                    if push_event(&tx, &stats, event) == PushOutcome::Closed {
                        break;
                    }
                }
            }
        }

        debug!("syslog_udp source stopped");
    }
}
