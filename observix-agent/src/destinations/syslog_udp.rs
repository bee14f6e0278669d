//! syslog_udp destination
//!
//! One RFC3164-style datagram per event: `<PRI>TIMESTAMP HOST APPNAME: RAW`.
//! Sends are best-effort; there is no timeout on UDP.

use anyhow::Context;
use observix_core::Event;
use observix_core::domain::pipeline::SyslogUdpDestOptions;
use tokio::net::UdpSocket;

use super::BatchOutcome;

pub struct SyslogUdpDestination {
    socket: UdpSocket,
    target: String,
    pri: u8,
    hostname: Option<String>,
    appname: String,
}

impl SyslogUdpDestination {
    pub async fn open(options: &SyslogUdpDestOptions) -> anyhow::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .with_context(|| "bind syslog_udp destination socket")?;

        Ok(Self {
            socket,
            target: format!("{}:{}", options.host, options.port),
            pri: options.pri,
            hostname: options.hostname.clone(),
            appname: options.appname.clone(),
        })
    }

    pub async fn send(&mut self, batch: &[Event]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for event in batch {
            let line = format_line(event, self.pri, self.hostname.as_deref(), &self.appname);
            match self.socket.send_to(line.as_bytes(), &self.target).await {
                Ok(_) => outcome.delivered += 1,
                Err(e) => {
                    outcome.last_error = Some(format!("udp send to {}: {}", self.target, e));
                }
            }
        }

        outcome
    }
}

/// RFC3164 BSD framing with the event's own timestamp (UTC).
///
/// HOST is the configured `hostname` option, falling back to the event's
/// `agent_id` annotation, then "observix".
fn format_line(event: &Event, pri: u8, hostname: Option<&str>, appname: &str) -> String {
    let ts = event.ts.format("%b %d %H:%M:%S");
    let host = hostname
        .or_else(|| event.meta.get("agent_id").and_then(|value| value.as_str()))
        .unwrap_or("observix");
    let msg = event.raw.replace('\n', " ");
    format!("<{}>{} {} {}: {}", pri, ts, host, appname, msg.trim())
}
