use std::io::Read;

use serde::{Deserialize, Serialize};

/// Display classification for one stored object name.
///
/// Presentation only: the gallery decides between an image card and a
/// row-inspection modal on the suffix alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GalleryKind {
    Image,
    Csv,
    Other,
}

const IMAGE_SUFFIXES: [&str; 5] = [".png", ".jpg", ".jpeg", ".gif", ".webp"];

/// One object in the destination container, in backend order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryEntry {
    pub name: String,
    pub kind: GalleryKind,
}

impl GalleryEntry {
    pub fn classify(name: impl Into<String>) -> Self {
        let name = name.into();
        let lowered = name.to_ascii_lowercase();
        let kind = if lowered.ends_with(".csv") {
            GalleryKind::Csv
        } else if IMAGE_SUFFIXES
            .iter()
            .any(|suffix| lowered.ends_with(suffix))
        {
            GalleryKind::Image
        } else {
            GalleryKind::Other
        };
        Self { name, kind }
    }
}

/// One parsed row of an uploaded assessment report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedReportRow {
    pub category: String,
    pub option: String,
    pub score: u16,
}

/// An uploaded report re-read for display, with the score column re-summed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedReport {
    pub rows: Vec<ParsedReportRow>,
    pub total: u32,
}

#[derive(Debug, Deserialize)]
struct ReportRow {
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Selected Option")]
    option: String,
    #[serde(rename = "Score")]
    score: u16,
}

/// Parse the CSV produced by the report renderer back into rows.
pub fn parse_report_csv<R: Read>(reader: R) -> Result<ParsedReport, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    let mut total: u32 = 0;

    for record in csv_reader.deserialize::<ReportRow>() {
        let row = record?;
        total += u32::from(row.score);
        rows.push(ParsedReportRow {
            category: row.category,
            option: row.option,
            score: row.score,
        });
    }

    Ok(ParsedReport { rows, total })
}
