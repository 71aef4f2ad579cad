//! Human-readable text blocks for a cluster assignment.
//!
//! Each cluster renders as a header line followed by one bullet per
//! member, in member order:
//!
//! ```text
//! Cluster 1 (2 ideas):
//! - Prices are sticky
//! - Wages adjust slowly
//! ```
//!
//! The header always says "ideas", even for a single member. Empty
//! clusters render as the header plus a trailing newline.

use std::collections::BTreeMap;

use crate::types::Idea;
use crate::vector::ClusterAssignment;

/// Renders one text block per cluster, keyed by cluster index.
///
/// Every cluster index in the assignment gets an entry, empty ones
/// included. Pure: no I/O, no mutation.
pub fn summarize(assignment: &ClusterAssignment) -> BTreeMap<usize, String> {
    assignment
        .iter()
        .map(|(index, members)| (index, summarize_cluster(index, members)))
        .collect()
}

/// Renders a single cluster's block.
pub fn summarize_cluster(index: usize, members: &[Idea]) -> String {
    let header = format!("Cluster {index} ({} ideas):\n", members.len());
    let bullets: Vec<String> = members
        .iter()
        .map(|idea| format!("- {}", idea.main_point))
        .collect();

    header + &bullets.join("\n")
}

/// Joins all blocks in ascending cluster order, separated by a blank line.
pub fn render_summaries(summaries: &BTreeMap<usize, String>) -> String {
    summaries
        .values()
        .map(|block| block.trim_end_matches('\n'))
        .collect::<Vec<_>>()
        .join("\n\n")
}
