//! Text and JSON rendering of group summaries.

use std::fmt::Write;

use crate::models::GroupSummary;

/// Default bar width in characters for the longest bar.
pub const DEFAULT_BAR_WIDTH: usize = 40;

/// Horizontal bar chart of track counts, one bar per group.
///
/// Built from one query's summaries and dropped with them; a new query builds
/// a new chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarChart {
    bars: Vec<(String, usize)>,
    width: usize,
}

impl BarChart {
    pub fn from_summaries(summaries: &[GroupSummary], width: usize) -> Self {
        Self {
            bars: summaries
                .iter()
                .map(|s| (s.group_label.clone(), s.track_count))
                .collect(),
            width: width.max(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Bar length for `count`, scaled so the largest count fills the width.
    /// Any non-zero count gets at least one cell.
    fn bar_len(&self, count: usize, max: usize) -> usize {
        if max == 0 || count == 0 {
            return 0;
        }
        ((count * self.width + max / 2) / max).max(1)
    }

    pub fn render(&self) -> String {
        let max = self.bars.iter().map(|(_, c)| *c).max().unwrap_or(0);
        let label_width = self
            .bars
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for (label, count) in &self.bars {
            let pad = label_width - label.chars().count();
            let _ = writeln!(
                out,
                "{}{} | {} {}",
                label,
                " ".repeat(pad),
                "█".repeat(self.bar_len(*count, max)),
                count
            );
        }
        out
    }
}

/// List view: one section per group with its count and track labels.
pub fn render_list(summaries: &[GroupSummary]) -> String {
    let mut out = String::new();
    for (i, summary) in summaries.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{} ({})", summary.group_label, summary.track_count);
        for label in &summary.track_labels {
            let _ = writeln!(out, "  - {}", label);
        }
    }
    out
}

/// Chart followed by the list view.
pub fn render_text(summaries: &[GroupSummary], width: usize) -> String {
    let chart = BarChart::from_summaries(summaries, width);
    format!("{}\n{}", chart.render(), render_list(summaries))
}

/// Summaries as a pretty-printed JSON array.
pub fn render_json(summaries: &[GroupSummary]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summaries)
}
