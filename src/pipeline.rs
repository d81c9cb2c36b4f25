//! The full query pipeline: artist filter, key normalization, grouping,
//! deduplication and aggregation, with per-stage counters.

use serde::Serialize;

use crate::aggregate::{Aggregator, DedupScope, Offer};
use crate::filter::{matches_artist, prepare_query};
use crate::keys::{group_for, has_group, GroupBy, UngroupedPolicy};
use crate::models::{GroupSummary, Grouping, PipelineStats, TrackRecord};

/// Pipeline settings. The defaults give every normalized key its own group,
/// keep ungrouped keys (`Unknown`, or keys missing from the relative table)
/// as their own group, and deduplicate across the query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    pub group_by: GroupBy,
    pub ungrouped: UngroupedPolicy,
    pub dedup_scope: DedupScope,
}

/// Result of one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineOutput {
    pub summaries: Vec<GroupSummary>,
    pub stats: PipelineStats,
}

impl PipelineOutput {
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

/// Run the pipeline over `records` for an artist `query`.
///
/// Never fails: malformed records, unknown keys and ungrouped keys are counted
/// and either skipped or given a fallback group. A blank query yields no
/// groups.
pub fn run(records: &[TrackRecord], query: &str, config: &PipelineConfig) -> PipelineOutput {
    let mut stats = PipelineStats {
        input_records: records.len(),
        ..Default::default()
    };

    let Some(query_lower) = prepare_query(query) else {
        log::info!("Blank query, nothing to group");
        stats.artist_mismatches = records.len();
        return PipelineOutput {
            summaries: Vec::new(),
            stats,
        };
    };

    let mut aggregator = Aggregator::new(config.dedup_scope);

    for record in records {
        // Stage 1: artist filter
        match matches_artist(record, &query_lower) {
            Ok(true) => {}
            Ok(false) => {
                stats.artist_mismatches += 1;
                continue;
            }
            Err(e) => {
                log::warn!("Skipping '{}': {}", record.title, e);
                stats.malformed_records += 1;
                continue;
            }
        }

        // Stages 2-4: key normalization, grouping, dedup
        let placed = aggregator.offer_record(record, |key| {
            if key.is_unknown() {
                stats.unknown_keys += 1;
            }
            let grouping = group_for(key, config.group_by, config.ungrouped);
            if grouping != Grouping::Skip && !has_group(key, config.group_by) {
                stats.ungrouped_fallbacks += 1;
            }
            grouping
        });
        match placed {
            Ok(Some(Offer::Accepted)) => stats.accepted_tracks += 1,
            Ok(Some(Offer::Duplicate { .. })) => stats.duplicates_merged += 1,
            Ok(None) => stats.ungrouped_skipped += 1,
            Err(e) => {
                log::warn!("Skipping '{}': {}", record.title, e);
                stats.malformed_records += 1;
            }
        }
    }

    let summaries = aggregator.finish();
    stats.groups = summaries.len();

    log::info!(
        "Grouped {} of {} records into {} groups ({} duplicates, {} malformed)",
        stats.accepted_tracks,
        stats.input_records,
        stats.groups,
        stats.duplicates_merged,
        stats.malformed_records
    );

    PipelineOutput { summaries, stats }
}
