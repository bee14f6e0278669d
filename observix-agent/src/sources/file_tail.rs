//! file_tail source
//!
//! Polls a text file for appended lines, `tail -f` style. `from_start` reads
//! the whole file instead of seeking to the end first.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use observix_core::Event;
use observix_core::domain::pipeline::FileTailOptions;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader, SeekFrom};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::stats::PipelineStats;

use super::{PushOutcome, push_event};

const IDLE_POLL: Duration = Duration::from_millis(200);

pub struct FileTailSource {
    reader: BufReader<File>,
    // Partial line carried across reads until its newline arrives.
    pending: String,
}

impl FileTailSource {
    pub async fn open(options: &FileTailOptions) -> anyhow::Result<Self> {
        let mut file = File::open(&options.path)
            .await
            .with_context(|| format!("open file_tail source: {}", options.path))?;

        if !options.from_start {
            file.seek(SeekFrom::End(0))
                .await
                .with_context(|| "seek to end of tailed file")?;
        }

        debug!("file_tail source reading {}", options.path);
        Ok(Self {
            reader: BufReader::new(file),
            pending: String::new(),
        })
    }

    pub async fn run(
        mut self,
        tx: mpsc::Sender<Event>,
        stats: Arc<PipelineStats>,
        cancel: CancellationToken,
    ) {
        let mut line = String::new();

        loop {
            if cancel.is_cancelled() {
                break;
            }

            line.clear();
            match self.reader.read_line(&mut line).await {
                Ok(0) => {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(IDLE_POLL) => {}
                    }
                }
                Ok(_) => {
                    if !line.ends_with('\n') {
                        // Writer is mid-line; wait for the rest.
                        self.pending.push_str(&line);
                        continue;
                    }

                    let mut full = std::mem::take(&mut self.pending);
                    full.push_str(&line);
                    let raw = full.trim_end_matches(['\r', '\n']).to_string();
                    if raw.is_empty() {
                        continue;
                    }

                    if push_event(&tx, &stats, Event::now(raw)) == PushOutcome::Closed {
                        break;
                    }
                }
                Err(e) => {
                    warn!("file_tail read error: {}", e);
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(IDLE_POLL) => {}
                    }
                }
            }
        }

        debug!("file_tail source stopped");
    }
}
