//! Table formatting for clustering and retrieval results.

use comfy_table::{
    Attribute, Cell, CellAlignment, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};

use super::theme::THEME;
use crate::retrieve::RetrievalReport;
use crate::vector::ClusteringOutcome;

/// Longest main point shown in a table cell before truncation.
const MAX_POINT_CHARS: usize = 60;

/// Builder for creating formatted tables.
pub struct TableBuilder {
    table: Table,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.apply_modifier(UTF8_ROUND_CORNERS);
        Self { table }
    }

    pub fn set_headers(mut self, headers: Vec<&str>) -> Self {
        let header_cells: Vec<Cell> = headers
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect();
        self.table.set_header(header_cells);
        self
    }

    pub fn add_row(mut self, row: Vec<Cell>) -> Self {
        self.table.add_row(row);
        self
    }

    pub fn build(self) -> String {
        self.table.to_string()
    }
}

/// One row per cluster: size and the first member as a sample.
pub fn create_cluster_table(outcome: &ClusteringOutcome) -> String {
    let mut builder = TableBuilder::new().set_headers(vec!["Cluster", "Ideas", "Sample"]);

    for (index, members) in outcome.assignment.iter() {
        let sample = members
            .first()
            .map(|idea| truncate(&idea.main_point))
            .unwrap_or_else(|| "<empty>".to_string());
        let size = Cell::new(members.len()).set_alignment(CellAlignment::Right);
        let size = if members.is_empty() {
            THEME.tint(size, THEME.empty_cluster)
        } else {
            size
        };

        builder = builder.add_row(vec![Cell::new(index), size, Cell::new(sample)]);
    }

    builder.build()
}

/// Neighbours grouped by centroid, in centroid order.
pub fn create_neighbors_table(report: &RetrievalReport) -> String {
    let mut builder = TableBuilder::new().set_headers(vec![
        "Centroid",
        "Main Point",
        "Chunk",
        "Quotation",
        "Similarity",
    ]);

    for group in &report.groups {
        for neighbor in &group.neighbors {
            let score = Cell::new(format!("{:.3}", neighbor.similarity_score))
                .set_alignment(CellAlignment::Right);
            let score = match THEME.similarity_color(neighbor.similarity_score) {
                Some(color) => THEME.tint(score, color),
                None => score,
            };
            builder = builder.add_row(vec![
                Cell::new(group.centroid_index),
                Cell::new(truncate(&neighbor.main_point)),
                Cell::new(neighbor.chunk_id),
                Cell::new(neighbor.quotation_id),
                score,
            ]);
        }
    }

    for (index, error) in &report.failures {
        let reason = error.to_string();
        let first_line = reason.lines().next().unwrap_or_default();
        builder = builder.add_row(vec![
            Cell::new(index),
            THEME.tint(
                Cell::new(format!("skipped: {first_line}")),
                THEME.skipped_lookup,
            ),
            Cell::new("-"),
            Cell::new("-"),
            Cell::new("-"),
        ]);
    }

    builder.build()
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_POINT_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(MAX_POINT_CHARS - 1).collect();
    format!("{head}…")
}
