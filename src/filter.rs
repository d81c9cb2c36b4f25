//! Artist filtering.
//!
//! Search results for an artist name also return covers, features and
//! similarly named acts; only records whose primary performer contains the
//! query are kept.

use crate::error::RecordError;
use crate::models::TrackRecord;

/// Lower-cased, trimmed query. `None` when the query is blank.
pub fn prepare_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Check one record against an already prepared (lower-cased) query.
pub fn matches_artist(record: &TrackRecord, query_lower: &str) -> Result<bool, RecordError> {
    let primary = record.primary_performer()?;
    Ok(primary.to_lowercase().contains(query_lower))
}

/// Keep records whose primary performer contains `query`, case-insensitively.
///
/// A blank query matches nothing. Records without performers are skipped
/// with a warning.
pub fn filter_by_artist<'a>(records: &'a [TrackRecord], query: &str) -> Vec<&'a TrackRecord> {
    let Some(query_lower) = prepare_query(query) else {
        return Vec::new();
    };

    records
        .iter()
        .filter(|record| match matches_artist(record, &query_lower) {
            Ok(matched) => matched,
            Err(e) => {
                log::warn!("Skipping '{}': {}", record.title, e);
                false
            }
        })
        .collect()
}
