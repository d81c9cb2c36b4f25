//! Per-record failures.
//!
//! None of these abort a run: a record that fails is skipped and counted in
//! [`PipelineStats`](crate::models::PipelineStats).

use thiserror::Error;

/// A track record missing a required field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("malformed record: no credited performers")]
    NoPerformers,
    #[error("malformed record: empty title")]
    EmptyTitle,
}
