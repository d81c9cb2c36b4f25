//! Title deduplication and aggregation into group summaries.
//!
//! Search results carry many releases of the same song (live takes, edits,
//! remasters). A title is dropped when its comparison key contains, or is
//! contained by, one already accepted. The check is greedy: the first release
//! seen wins and later ones are never re-ranked.

use rustc_hash::FxHashMap;

use crate::error::RecordError;
use crate::models::{GroupSummary, Grouping, NormalizedKey, TrackRecord};
use crate::normalize::{comparison_key, is_near_duplicate, normalize_key_label};

/// Which accepted titles a new title is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupScope {
    /// Every title accepted so far in the query, whatever its group
    #[default]
    Query,
    /// Only titles accepted into the same group
    Group,
}

/// Display label for a track: "Hello (A Minor)".
pub fn display_label(title: &str, key: &NormalizedKey) -> String {
    format!("{} ({})", title.trim(), key)
}

/// Group under construction. Labels and comparison keys are kept in step.
#[derive(Debug)]
struct GroupBuilder {
    label: String,
    track_labels: Vec<String>,
    comparison_keys: Vec<String>,
}

/// Outcome of offering a title to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Offer {
    Accepted,
    /// Near-duplicate of an already accepted label
    Duplicate { of: String },
}

/// Accumulates accepted labels per group in first-seen group order.
#[derive(Debug, Default)]
pub struct Aggregator {
    scope: DedupScope,
    groups: Vec<GroupBuilder>,
    index: FxHashMap<String, usize>, // group label -> position in `groups`
    duplicates: usize,
}

impl Aggregator {
    pub fn new(scope: DedupScope) -> Self {
        Self {
            scope,
            ..Default::default()
        }
    }

    /// Offer a title to `group`. Returns whether it was kept.
    pub fn offer(&mut self, group: &str, title: &str, key: &NormalizedKey) -> Offer {
        let candidate = comparison_key(title);

        if let Some(existing) = self.find_duplicate(group, &candidate) {
            self.duplicates += 1;
            log::debug!("Merged '{}' into '{}'", title.trim(), existing);
            return Offer::Duplicate { of: existing };
        }

        let idx = match self.index.get(group) {
            Some(&idx) => idx,
            None => {
                self.groups.push(GroupBuilder {
                    label: group.to_string(),
                    track_labels: Vec::new(),
                    comparison_keys: Vec::new(),
                });
                self.index.insert(group.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };

        let builder = &mut self.groups[idx];
        builder.track_labels.push(display_label(title, key));
        builder.comparison_keys.push(candidate);
        Offer::Accepted
    }

    /// Normalize, group and offer one record.
    ///
    /// Returns `None` when `key_group_of` skips the record's key. A blank
    /// title is an error and leaves the aggregator untouched.
    pub fn offer_record<F>(
        &mut self,
        record: &TrackRecord,
        key_group_of: F,
    ) -> Result<Option<Offer>, RecordError>
    where
        F: FnOnce(&NormalizedKey) -> Grouping,
    {
        let title = record.display_title()?;
        let key = normalize_key_label(record.key_label.as_deref());
        Ok(match key_group_of(&key) {
            Grouping::Group(group) => Some(self.offer(&group, title, &key)),
            Grouping::Skip => None,
        })
    }

    fn find_duplicate(&self, group: &str, candidate: &str) -> Option<String> {
        let in_scope: Vec<&GroupBuilder> = match self.scope {
            DedupScope::Query => self.groups.iter().collect(),
            DedupScope::Group => self
                .index
                .get(group)
                .map(|&idx| vec![&self.groups[idx]])
                .unwrap_or_default(),
        };

        in_scope.into_iter().find_map(|builder| {
            builder
                .comparison_keys
                .iter()
                .position(|accepted| is_near_duplicate(accepted, candidate))
                .map(|pos| builder.track_labels[pos].clone())
        })
    }

    /// Number of titles rejected as near-duplicates so far.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Build summaries sorted by track count, descending. Ties keep the
    /// order in which their groups were first seen.
    pub fn finish(self) -> Vec<GroupSummary> {
        let mut summaries: Vec<GroupSummary> = self
            .groups
            .into_iter()
            .map(|builder| GroupSummary {
                group_label: builder.label,
                track_count: builder.track_labels.len(),
                track_labels: builder.track_labels,
            })
            .collect();

        // sort_by is stable
        summaries.sort_by(|a, b| b.track_count.cmp(&a.track_count));
        summaries
    }
}

/// Deduplicate and group records, comparing titles across the whole query.
///
/// `key_group_of` maps each record's normalized key to its display group;
/// records it skips, and records with a blank title, contribute nothing.
pub fn aggregate<'a, I, F>(records: I, key_group_of: F) -> Vec<GroupSummary>
where
    I: IntoIterator<Item = &'a TrackRecord>,
    F: FnMut(&NormalizedKey) -> Grouping,
{
    aggregate_with_scope(records, key_group_of, DedupScope::default())
}

/// [`aggregate`] with an explicit deduplication scope.
pub fn aggregate_with_scope<'a, I, F>(
    records: I,
    mut key_group_of: F,
    scope: DedupScope,
) -> Vec<GroupSummary>
where
    I: IntoIterator<Item = &'a TrackRecord>,
    F: FnMut(&NormalizedKey) -> Grouping,
{
    let mut aggregator = Aggregator::new(scope);

    for record in records {
        if let Err(e) = aggregator.offer_record(record, &mut key_group_of) {
            log::warn!("Skipping '{}': {}", record.title, e);
        }
    }

    aggregator.finish()
}
