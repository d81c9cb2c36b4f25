//! Key grouping library - groups an artist's tracks by musical key.
//!
//! The pipeline filters search results to the queried artist, normalizes key
//! labels, buckets keys (optionally by relative major/minor pairing) and
//! collapses re-releases of the same song.

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod keys;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod safety;
pub mod session;
pub mod source;

pub use aggregate::{aggregate, aggregate_with_scope, DedupScope};
pub use error::RecordError;
pub use filter::filter_by_artist;
pub use keys::{group_key, GroupBy, UngroupedPolicy, RELATIVE_KEY_GROUPS};
pub use models::{GroupSummary, Grouping, NormalizedKey, PipelineStats, TrackRecord};
pub use normalize::{comparison_key, normalize_key};
pub use pipeline::{run, PipelineConfig, PipelineOutput};
