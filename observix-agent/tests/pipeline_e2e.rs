//! End-to-end pipeline tests over real UDP sockets
//!
//! Covers the raw forwarding path (batch size and dwell accounting), queue
//! pressure with a stalled destination, and graceful shutdown.

use std::time::Duration;

use observix_agent::pipeline::{AgentIdentity, RunningPipeline};
use observix_agent::stats::StatsSnapshot;
use observix_core::domain::pipeline::PipelineSpec;
use observix_core::dto::assignment::AssignedPipeline;
use uuid::Uuid;

fn identity() -> AgentIdentity {
    AgentIdentity {
        agent_id: "agent-a".to_string(),
        region: "eu-west-1".to_string(),
    }
}

fn assigned(spec: serde_json::Value) -> AssignedPipeline {
    let spec: PipelineSpec = serde_json::from_value(spec).unwrap();
    AssignedPipeline {
        pipeline_id: Uuid::new_v4(),
        name: "test-pipeline".to_string(),
        version: 1,
        enabled: true,
        spec,
    }
}

async fn free_udp_port() -> u16 {
    let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.local_addr().unwrap().port()
}

/// Poll the pipeline's stats until `predicate` holds or the timeout elapses.
async fn wait_for_stats(
    pipeline: &RunningPipeline,
    timeout: Duration,
    predicate: impl Fn(&StatsSnapshot) -> bool,
) -> StatsSnapshot {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let snapshot = pipeline.stats.snapshot();
        if predicate(&snapshot) {
            return snapshot;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("stats predicate not satisfied in time: {snapshot:?}");
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

#[tokio::test]
async fn raw_forwarder_delivers_in_order_with_batch_accounting() {
    let sink = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let sink_port = sink.local_addr().unwrap().port();
    let source_port = free_udp_port().await;

    let pipeline = RunningPipeline::start(
        &assigned(serde_json::json!({
            "source": {"type": "syslog_udp", "options": {"host": "127.0.0.1", "port": source_port}},
            "destination": {"type": "syslog_udp", "options": {"host": "127.0.0.1", "port": sink_port}},
            "batch_max_events": 2,
            "batch_max_seconds": 1.0
        })),
        &identity(),
    )
    .await
    .unwrap();

    let sender = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let target = format!("127.0.0.1:{}", source_port);
    for body in ["a", "b", "c"] {
        sender.send_to(body.as_bytes(), &target).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // Exactly three framed datagrams, in order.
    let mut buf = [0u8; 2048];
    for expected in ["a", "b", "c"] {
        let (len, _) = tokio::time::timeout(Duration::from_secs(5), sink.recv_from(&mut buf))
            .await
            .expect("destination datagram timed out")
            .unwrap();
        let datagram = String::from_utf8_lossy(&buf[..len]).to_string();
        assert!(
            datagram.ends_with(&format!("observix: {}", expected)),
            "unexpected datagram: {datagram}"
        );
        assert!(datagram.starts_with("<13>"), "missing PRI: {datagram}");
    }

    // One full batch of two, one timeout flush of one.
    let snapshot = wait_for_stats(&pipeline, Duration::from_secs(5), |s| {
        s.sent_events == 3 && s.sent_batches == 2
    })
    .await;
    assert_eq!(snapshot.failed_batches, 0);
    assert_eq!(snapshot.dropped_queue_full, 0);
    assert!(snapshot.last_ok.is_some());
    assert!(snapshot.last_err.is_none());

    // Graceful shutdown joins all three tasks within the deadline.
    assert!(pipeline.stop(Duration::from_secs(5)).await);
}

#[tokio::test]
async fn queue_pressure_drops_tail_and_bounds_buffer() {
    // A TCP server that reads forever and never responds, so the HTTP
    // destination stalls for its full timeout.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let stall_port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                use tokio::io::AsyncReadExt;
                let mut buf = [0u8; 1024];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {}
                    }
                }
            });
        }
    });

    let source_port = free_udp_port().await;
    let pipeline = RunningPipeline::start(
        &assigned(serde_json::json!({
            "source": {
                "type": "syslog_udp",
                "options": {"host": "127.0.0.1", "port": source_port, "max_queue_size": 100}
            },
            "destination": {
                "type": "http",
                "options": {"url": format!("http://127.0.0.1:{}/ingest", stall_port), "timeout_seconds": 30.0}
            },
            "batch_max_events": 1,
            "batch_max_seconds": 0.05
        })),
        &identity(),
    )
    .await
    .unwrap();

    let sender = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let target = format!("127.0.0.1:{}", source_port);
    for i in 0..2000u32 {
        sender.send_to(b"pressure", &target).await.unwrap();
        if i % 50 == 0 {
            // Pace the burst so the kernel socket buffer does not eat the
            // loss before our queue accounting sees it.
            tokio::time::sleep(Duration::from_micros(200)).await;
        }
    }

    let snapshot = wait_for_stats(&pipeline, Duration::from_secs(5), |s| {
        s.dropped_queue_full > 0
    })
    .await;

    // The queue is the sole pressure boundary.
    assert!(snapshot.buffer <= 100, "buffer exceeded bound: {snapshot:?}");
    assert!(snapshot.recv + snapshot.dropped_queue_full <= 2000);
    // Everything that arrived was either accepted or counted as dropped;
    // with a stalled destination nearly all of the burst is dropped.
    assert!(snapshot.dropped_queue_full >= 100, "{snapshot:?}");

    // The destination is stuck inside its 30s HTTP send, so a short deadline
    // must report the stop as unclean (tasks abandoned).
    assert!(!pipeline.stop(Duration::from_millis(300)).await);
}

#[tokio::test]
async fn http_listener_source_ingests_json_and_raw_bodies() {
    let listener_port = {
        let probe = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        probe.local_addr().unwrap().port()
    };
    let out_path = std::env::temp_dir().join(format!("observix-http-{}.log", Uuid::new_v4()));

    let pipeline = RunningPipeline::start(
        &assigned(serde_json::json!({
            "source": {
                "type": "http_listener",
                "options": {"host": "127.0.0.1", "port": listener_port}
            },
            "destination": {"type": "file", "options": {"path": out_path.to_str().unwrap()}},
            "batch_max_events": 10,
            "batch_max_seconds": 0.1
        })),
        &identity(),
    )
    .await
    .unwrap();

    let ingest_url = format!("http://127.0.0.1:{}/ingest", listener_port);
    let client = reqwest::Client::new();

    // JSON array: one event per item, objects keep their raw field.
    let response = client
        .post(&ingest_url)
        .json(&serde_json::json!(["a", {"raw": "b", "level": "warn"}]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);
    assert_eq!(response.text().await.unwrap(), "accepted=2");

    // Raw text body: one event.
    let response = client
        .post(&ingest_url)
        .body("c\n")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);

    // Empty and malformed bodies are rejected.
    let response = client.post(&ingest_url).body("").send().await.unwrap();
    assert_eq!(response.status(), 400);
    let response = client
        .post(&ingest_url)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    wait_for_stats(&pipeline, Duration::from_secs(5), |s| s.sent_events == 3).await;
    let contents = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(contents, "a\nb\nc\n");

    assert!(pipeline.stop(Duration::from_secs(5)).await);
    let _ = std::fs::remove_file(&out_path);
}

#[tokio::test]
async fn file_tail_source_forwards_appended_lines() {
    let dir = std::env::temp_dir();
    let tail_path = dir.join(format!("observix-tail-{}.log", Uuid::new_v4()));
    let out_path = dir.join(format!("observix-out-{}.log", Uuid::new_v4()));
    std::fs::write(&tail_path, "old line\n").unwrap();

    let pipeline = RunningPipeline::start(
        &assigned(serde_json::json!({
            "source": {"type": "file_tail", "options": {"path": tail_path.to_str().unwrap()}},
            "destination": {"type": "file", "options": {"path": out_path.to_str().unwrap()}},
            "batch_max_events": 10,
            "batch_max_seconds": 0.1
        })),
        &identity(),
    )
    .await
    .unwrap();

    // Give the tail a moment to reach EOF, then append.
    tokio::time::sleep(Duration::from_millis(300)).await;
    {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(&tail_path)
            .unwrap();
        writeln!(file, "new line").unwrap();
    }

    wait_for_stats(&pipeline, Duration::from_secs(5), |s| s.sent_events == 1).await;

    let contents = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(contents, "new line\n");

    assert!(pipeline.stop(Duration::from_secs(5)).await);
    let _ = std::fs::remove_file(&tail_path);
    let _ = std::fs::remove_file(&out_path);
}
