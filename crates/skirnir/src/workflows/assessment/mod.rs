//! Pressure-ulcer risk assessment: the scored questionnaire, CSV report
//! rendering, and gallery presentation helpers.

pub mod domain;
pub mod gallery;
pub mod report;
pub mod scoring;

pub use domain::{Category, Selection, SelectionEntry};
pub use gallery::{parse_report_csv, GalleryEntry, GalleryKind, ParsedReport, ParsedReportRow};
pub use report::{build_filename, render_csv, AssessmentReport};
pub use scoring::{ScoreSummary, ScoreTable, ScoredRow, ScoringEngine, TableError};
