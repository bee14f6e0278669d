//! Batch processors
//!
//! `raw` forwards a batch unchanged; `indexed` round-trips it through the
//! indexer's normalize endpoint. Indexer errors never kill a pipeline: the
//! batcher applies the `fallback_to_raw` policy and the next batch is a
//! fresh attempt.

pub mod indexed;

use observix_core::Event;
use observix_core::domain::pipeline::ProcessorSpec;
use thiserror::Error;

pub use indexed::IndexedProcessor;

pub enum Processor {
    Raw,
    Indexed(IndexedProcessor),
}

/// Per-batch processor failure; becomes `failed_batches` and `last_err`.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("indexer unavailable: {0}")]
    IndexerUnavailable(String),
    #[error("indexer timed out after {0:.1}s")]
    IndexerTimeout(f64),
    #[error("indexer returned a malformed response: {0}")]
    IndexerMalformed(String),
}

impl Processor {
    pub fn from_spec(spec: &ProcessorSpec) -> Processor {
        match spec {
            ProcessorSpec::Raw => Processor::Raw,
            ProcessorSpec::Indexed { options } => {
                Processor::Indexed(IndexedProcessor::new(options))
            }
        }
    }

    /// Whether a failed batch should pass through unnormalized instead of
    /// being dropped.
    pub fn fallback_to_raw(&self) -> bool {
        match self {
            Processor::Raw => true,
            Processor::Indexed(indexed) => indexed.fallback_to_raw(),
        }
    }

    /// Transform one batch. `raw` mode cannot fail.
    pub async fn process(&self, batch: &[Event]) -> Result<Vec<Event>, ProcessorError> {
        match self {
            Processor::Raw => Ok(batch.to_vec()),
            Processor::Indexed(indexed) => indexed.process(batch).await,
        }
    }
}
