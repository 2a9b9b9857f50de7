use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};

use super::domain::Selection;
use super::scoring::{ScoreSummary, ScoringEngine, TableError};

/// A scored selection rendered for upload: the CSV payload plus the
/// destination object name.
#[derive(Debug, Clone)]
pub struct AssessmentReport {
    pub summary: ScoreSummary,
    pub csv: String,
    pub filename: String,
}

impl AssessmentReport {
    pub fn generate(
        engine: &ScoringEngine,
        selection: &Selection,
        generated_at: DateTime<Utc>,
    ) -> Result<Self, TableError> {
        let summary = engine.compute(selection)?;
        let csv = render_csv(&summary);
        let filename = build_filename(summary.total(), generated_at);
        Ok(Self {
            summary,
            csv,
            filename,
        })
    }
}

/// Render the summary as CSV: a fixed header then one row per selected
/// category, in selection order, each line `\n`-terminated.
///
/// Fields are written raw. Option text never contains commas or line breaks
/// (the score table rejects such options at construction), so no quoting is
/// applied; this renderer is not a general-purpose CSV writer.
pub fn render_csv(summary: &ScoreSummary) -> String {
    let mut out = String::from("Category,Selected Option,Score\n");
    for row in summary.rows() {
        writeln!(out, "{},{},{}", row.category.label(), row.option, row.score)
            .expect("write report row");
    }
    out
}

/// Destination object name for a report: the total plus a UTC timestamp,
/// with `:` and `.` replaced so the name stays filesystem- and URL-safe.
pub fn build_filename(total: u16, generated_at: DateTime<Utc>) -> String {
    let stamp = generated_at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("assessment_{total}_{stamp}.csv")
}
