//! Table formatting utilities for CLI output.

use std::collections::BTreeMap;

use comfy_table::{CellAlignment, ContentArrangement, Table, presets};
use covlevel::CoverageLevel;

/// Level counts for a single locale.
pub struct LocaleSummary {
    /// Locale id (e.g., "de", "sr_Latn").
    pub locale: String,
    /// Number of paths at each level.
    pub counts: BTreeMap<CoverageLevel, usize>,
}

impl LocaleSummary {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Levels shown as columns; `undetermined` never comes out of a real path.
const COLUMNS: [CoverageLevel; 5] = [
    CoverageLevel::Core,
    CoverageLevel::Basic,
    CoverageLevel::Moderate,
    CoverageLevel::Modern,
    CoverageLevel::Comprehensive,
];

/// Format per-locale level counts as an ASCII table.
pub fn format_summary_table(summaries: &[LocaleSummary]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_BORDERS_ONLY);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec!["Locale".to_string()];
    header.extend(COLUMNS.iter().map(ToString::to_string));
    header.push("Total".to_string());
    table.set_header(header);

    for summary in summaries {
        let mut row = vec![summary.locale.clone()];
        row.extend(
            COLUMNS
                .iter()
                .map(|level| summary.counts.get(level).copied().unwrap_or(0).to_string()),
        );
        row.push(summary.total().to_string());
        table.add_row(row);
    }

    for index in 1..=COLUMNS.len() + 1 {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    table
}
