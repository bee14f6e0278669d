//! file destination
//!
//! Appends events to a file as newline-delimited raw lines or JSONL.

use anyhow::Context;
use observix_core::Event;
use observix_core::domain::pipeline::{FileDestOptions, FileFormat};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::BatchOutcome;

pub struct FileDestination {
    file: File,
    format: FileFormat,
}

impl FileDestination {
    pub async fn open(options: &FileDestOptions) -> anyhow::Result<Self> {
        if let Some(parent) = std::path::Path::new(&options.path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create destination directory: {}", parent.display()))?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&options.path)
            .await
            .with_context(|| format!("open file destination: {}", options.path))?;

        Ok(Self {
            file,
            format: options.format,
        })
    }

    pub async fn send(&mut self, batch: &[Event]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for event in batch {
            let line = match self.format {
                FileFormat::Raw => format!("{}\n", event.raw),
                FileFormat::Jsonl => match serde_json::to_string(event) {
                    Ok(json) => format!("{}\n", json),
                    Err(e) => {
                        outcome.last_error = Some(format!("encode event: {}", e));
                        continue;
                    }
                },
            };

            match self.file.write_all(line.as_bytes()).await {
                Ok(()) => outcome.delivered += 1,
                Err(e) => {
                    outcome.last_error = Some(format!("write event: {}", e));
                }
            }
        }

        if let Err(e) = self.file.flush().await {
            outcome.last_error = Some(format!("flush destination file: {}", e));
        }

        outcome
    }
}
