//! Core data models for key grouping.
//!
//! This module contains the record, key and summary types that flow through
//! the pipeline, plus the per-stage statistics.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::RecordError;

// ============================================================================
// Input Models
// ============================================================================

/// Raw track from a search results page.
///
/// Field names follow the search API's compact item keys (`n`, `k`, `as`);
/// the long names are accepted as aliases for hand-written fixtures.
/// Missing or `null` fields deserialize to empty values and are rejected later
/// by the pipeline rather than at parse time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    #[serde(rename = "n", alias = "title", default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "k", alias = "key", default)]
    pub key_label: Option<String>,
    #[serde(rename = "as", alias = "artists", default, deserialize_with = "null_as_default")]
    pub performers: Vec<String>, // Credited order, first entry is the primary performer
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TrackRecord {
    pub fn new(title: &str, key_label: &str, performers: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            key_label: Some(key_label.to_string()),
            performers: performers.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// First credited performer, used as the artist-match anchor.
    pub fn primary_performer(&self) -> Result<&str, RecordError> {
        self.performers
            .first()
            .map(String::as_str)
            .ok_or(RecordError::NoPerformers)
    }

    /// Trimmed title for display. Blank titles are malformed.
    pub fn display_title(&self) -> Result<&str, RecordError> {
        let title = self.title.trim();
        if title.is_empty() {
            Err(RecordError::EmptyTitle)
        } else {
            Ok(title)
        }
    }
}

// ============================================================================
// Key Models
// ============================================================================

/// Canonical key identity, e.g. "A♭ Minor" or "F# Major".
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    /// Sentinel for missing or unparseable key labels.
    pub const UNKNOWN: &'static str = "Unknown";

    pub(crate) fn from_parts(letter: char, accidental: Option<char>, mode: Mode) -> Self {
        let mut s = String::with_capacity(12);
        s.push(letter.to_ascii_uppercase());
        if let Some(acc) = accidental {
            s.push(acc);
        }
        s.push(' ');
        s.push_str(mode.as_str());
        NormalizedKey(s)
    }

    pub fn unknown() -> Self {
        NormalizedKey(Self::UNKNOWN.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Major or minor mode of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Major => "Major",
            Mode::Minor => "Minor",
        }
    }
}

/// Outcome of looking up a key's display group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grouping {
    Group(String),
    Skip,
}

// ============================================================================
// Output Models
// ============================================================================

/// One display bucket: a bar in the chart and a section in the list view.
///
/// Serialized with camelCase names (`groupLabel`, `trackCount`, `trackLabels`)
/// for presentation layers that consume JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub group_label: String,
    pub track_count: usize,
    pub track_labels: Vec<String>,
}

// ============================================================================
// Statistics (Instrumentation)
// ============================================================================

/// Per-stage counters for one pipeline run.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub input_records: usize,

    // Stage 1: artist filter
    pub malformed_records: usize,
    pub artist_mismatches: usize,

    // Stage 2/3: key normalization and grouping
    pub unknown_keys: usize,
    pub ungrouped_fallbacks: usize, // Permissive: key used as its own group
    pub ungrouped_skipped: usize,   // Strict: record dropped

    // Stage 4: dedup and aggregation
    pub duplicates_merged: usize,
    pub accepted_tracks: usize,
    pub groups: usize,
}

impl PipelineStats {
    /// Records that made it into any group, as a percentage of the input.
    pub fn acceptance_rate(&self) -> f64 {
        if self.input_records == 0 {
            0.0
        } else {
            100.0 * self.accepted_tracks as f64 / self.input_records as f64
        }
    }

    /// Log stats to stderr in JSON format
    pub fn log_phase(&self, phase: &str) {
        if let Ok(json) = serde_json::to_string_pretty(self) {
            eprintln!("[STATS:{}]\n{}", phase, json);
        }
    }

    /// Write stats to a JSON file
    pub fn write_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_performer() {
        let record = TrackRecord::new("Hello", "A Minor", &["Adele", "Someone"]);
        assert_eq!(record.primary_performer(), Ok("Adele"));

        let orphan = TrackRecord::new("Hello", "A Minor", &[]);
        assert_eq!(orphan.primary_performer(), Err(RecordError::NoPerformers));
    }

    #[test]
    fn test_display_title_trims() {
        let record = TrackRecord::new("  Hello  ", "A Minor", &["Adele"]);
        assert_eq!(record.display_title(), Ok("Hello"));

        let blank = TrackRecord::new("   ", "A Minor", &["Adele"]);
        assert_eq!(blank.display_title(), Err(RecordError::EmptyTitle));
    }

    #[test]
    fn test_deserialize_compact_item() {
        let json = r#"{"n": "Hello", "k": "A Minor", "as": ["Adele"], "b": 79}"#;
        let record: TrackRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, TrackRecord::new("Hello", "A Minor", &["Adele"]));
    }

    #[test]
    fn test_deserialize_missing_fields() {
        let record: TrackRecord = serde_json::from_str(r#"{"n": "Hello"}"#).unwrap();
        assert_eq!(record.key_label, None);
        assert!(record.performers.is_empty());
    }

    #[test]
    fn test_deserialize_null_fields() {
        let json = r#"{"n": null, "k": null, "as": null}"#;
        let record: TrackRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, TrackRecord::default());
        assert_eq!(record.display_title(), Err(RecordError::EmptyTitle));
        assert_eq!(record.primary_performer(), Err(RecordError::NoPerformers));
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = GroupSummary {
            group_label: "C / A minor".to_string(),
            track_count: 1,
            track_labels: vec!["Hello (A Minor)".to_string()],
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(
            json,
            r#"{"groupLabel":"C / A minor","trackCount":1,"trackLabels":["Hello (A Minor)"]}"#
        );
    }

    #[test]
    fn test_acceptance_rate() {
        let stats = PipelineStats {
            input_records: 4,
            accepted_tracks: 1,
            ..Default::default()
        };
        assert_eq!(stats.acceptance_rate(), 25.0);
        assert_eq!(PipelineStats::default().acceptance_rate(), 0.0);
    }
}
