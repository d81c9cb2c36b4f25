//! Last-write-wins result slot for overlapping queries.
//!
//! The pipeline has no cancellation. When a host lets a new query start
//! before an earlier one finishes, every query takes a ticket up front and
//! only the newest ticket may publish, so a slow earlier query can never
//! overwrite the results of a later one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::models::TrackRecord;
use crate::pipeline::{self, PipelineConfig, PipelineOutput};

/// Issued when a query starts; required to publish its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueryTicket(u64);

/// Holds the results of the most recently started query.
#[derive(Debug)]
pub struct LatestResults<T> {
    issued: AtomicU64,
    slot: Mutex<Option<(QueryTicket, Arc<T>)>>,
}

impl<T> Default for LatestResults<T> {
    fn default() -> Self {
        Self {
            issued: AtomicU64::new(0),
            slot: Mutex::new(None),
        }
    }
}

impl<T> LatestResults<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a query. Later tickets supersede earlier ones.
    pub fn begin(&self) -> QueryTicket {
        QueryTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Store `value` if `ticket` is still the newest issued. Returns the
    /// stored value, or `None` when a newer query has started.
    pub fn publish(&self, ticket: QueryTicket, value: T) -> Option<Arc<T>> {
        if ticket.0 != self.issued.load(Ordering::SeqCst) {
            return None;
        }
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        // A newer ticket may have published between the check and the lock
        if matches!(&*slot, Some((current, _)) if *current > ticket) {
            return None;
        }
        let stored = Arc::new(value);
        *slot = Some((ticket, Arc::clone(&stored)));
        Some(stored)
    }

    /// Results of the newest query that has published, if any.
    pub fn current(&self) -> Option<Arc<T>> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.as_ref().map(|(_, value)| Arc::clone(value))
    }
}

/// Runs queries with a fixed config and keeps the latest results.
#[derive(Debug, Default)]
pub struct Session {
    config: PipelineConfig,
    results: LatestResults<PipelineOutput>,
}

impl Session {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            results: LatestResults::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Start a query; pair with [`Session::complete`].
    pub fn begin(&self) -> QueryTicket {
        self.results.begin()
    }

    /// Run the pipeline for a started query and publish its output. Returns
    /// `None` when a newer query was started in the meantime.
    pub fn complete(
        &self,
        ticket: QueryTicket,
        records: &[TrackRecord],
        query: &str,
    ) -> Option<Arc<PipelineOutput>> {
        let output = pipeline::run(records, query, &self.config);
        let published = self.results.publish(ticket, output);
        if published.is_none() {
            log::debug!("Discarding results for '{}', superseded", query);
        }
        published
    }

    /// Begin and complete a query in one step.
    pub fn submit(&self, records: &[TrackRecord], query: &str) -> Option<Arc<PipelineOutput>> {
        let ticket = self.begin();
        self.complete(ticket, records, query)
    }

    pub fn latest(&self) -> Option<Arc<PipelineOutput>> {
        self.results.current()
    }
}
