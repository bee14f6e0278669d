//! http destination
//!
//! POSTs each batch as one JSON array of events.

use std::time::Duration;

use observix_core::Event;
use observix_core::domain::pipeline::HttpDestOptions;

use super::BatchOutcome;

pub struct HttpDestination {
    client: reqwest::Client,
    url: String,
}

impl HttpDestination {
    pub fn new(options: &HttpDestOptions) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs_f64(options.timeout_seconds))
            .build()
            .unwrap_or_default();

        Self {
            client,
            url: options.url.clone(),
        }
    }

    pub async fn send(&mut self, batch: &[Event]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        let result = self.client.post(&self.url).json(&batch).send().await;
        match result {
            Ok(response) if response.status().is_success() => {
                outcome.delivered = batch.len() as u64;
            }
            Ok(response) => {
                outcome.last_error = Some(format!("http destination status {}", response.status()));
            }
            Err(e) => {
                outcome.last_error = Some(format!("http destination: {}", e));
            }
        }

        outcome
    }
}
