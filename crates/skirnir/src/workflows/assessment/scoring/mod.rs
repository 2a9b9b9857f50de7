mod table;

pub use table::{ScoreTable, TableError};

use super::domain::{Category, Selection};
use serde::Serialize;

/// Stateless scorer applying the static option table to a selection.
pub struct ScoringEngine {
    table: ScoreTable,
}

impl ScoringEngine {
    pub fn new(table: ScoreTable) -> Self {
        Self { table }
    }

    /// Engine over the standard Braden table, validated at construction.
    pub fn standard() -> Result<Self, TableError> {
        Ok(Self::new(ScoreTable::standard()?))
    }

    pub fn table(&self) -> &ScoreTable {
        &self.table
    }

    /// Score every selected category and sum the results.
    ///
    /// An option missing from the table is a configuration defect, not a
    /// user-facing condition; it fails the whole computation.
    pub fn compute(&self, selection: &Selection) -> Result<ScoreSummary, TableError> {
        let mut rows = Vec::with_capacity(selection.len());
        let mut total: u16 = 0;

        for entry in selection.entries() {
            let score = self.table.score(entry.category, &entry.option)?;
            total += u16::from(score);
            rows.push(ScoredRow {
                category: entry.category,
                option: entry.option.clone(),
                score,
            });
        }

        Ok(ScoreSummary { rows, total })
    }
}

/// One scored answer, in selection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredRow {
    pub category: Category,
    pub option: String,
    pub score: u8,
}

/// Derived, read-only view of a scored selection.
///
/// Always recomputed from the current selection; never cached across
/// selection changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreSummary {
    rows: Vec<ScoredRow>,
    total: u16,
}

impl ScoreSummary {
    pub fn rows(&self) -> &[ScoredRow] {
        &self.rows
    }

    pub fn total(&self) -> u16 {
        self.total
    }

    pub fn score_for(&self, category: Category) -> Option<u8> {
        self.rows
            .iter()
            .find(|row| row.category == category)
            .map(|row| row.score)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
