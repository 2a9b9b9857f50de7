use std::collections::BTreeMap;

use super::super::domain::Category;

/// Violations detected while building or consulting the score table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("category {category} lists option '{option}' more than once")]
    DuplicateOption {
        category: &'static str,
        option: String,
    },
    #[error("option '{option}' in category {category} has score {score} outside 1..=4")]
    ScoreOutOfRange {
        category: &'static str,
        option: String,
        score: u8,
    },
    #[error("option '{option}' in category {category} contains a comma or line break")]
    UnsafeOptionText {
        category: &'static str,
        option: String,
    },
    #[error("no score configured for option '{option}' in category {category}")]
    UnknownOption {
        category: &'static str,
        option: String,
    },
}

/// The consolidated `(category, option) -> score` table.
///
/// Scores are static configuration, never derived; an option without a
/// score is a construction-time error, not a lookup miss at submit time.
///
/// Construction also rejects option text containing commas or line breaks:
/// the CSV renderer emits fields unescaped and relies on this table-level
/// contract.
#[derive(Debug, Clone)]
pub struct ScoreTable {
    options: BTreeMap<Category, Vec<(String, u8)>>,
}

impl ScoreTable {
    /// The standard Braden scale: six categories, 3-4 scored options each.
    pub fn standard() -> Result<Self, TableError> {
        Self::from_rows([
            (
                Category::SensoryPerception,
                &[
                    ("Completely limited", 1),
                    ("Very limited", 2),
                    ("Slightly limited", 3),
                    ("No Impairment", 4),
                ][..],
            ),
            (
                Category::Moisture,
                &[
                    ("Constantly moist", 1),
                    ("Very moist", 2),
                    ("Occasionally moist", 3),
                    ("Rarely moist", 4),
                ][..],
            ),
            (
                Category::Activity,
                &[
                    ("Bedfast", 1),
                    ("Chairfast", 2),
                    ("Walks occasionally", 3),
                    ("Walks frequently", 4),
                ][..],
            ),
            (
                Category::Mobility,
                &[
                    ("Completely immobile", 1),
                    ("Very limited", 2),
                    ("Slightly limited", 3),
                    ("No limitations", 4),
                ][..],
            ),
            (
                Category::Nutrition,
                &[
                    ("Very poor", 1),
                    ("Probably inadequate", 2),
                    ("Adequate", 3),
                    ("Excellent", 4),
                ][..],
            ),
            (
                Category::FrictionAndShear,
                &[
                    ("Problem", 1),
                    ("Potential problem", 2),
                    ("No apparent problem", 3),
                ][..],
            ),
        ])
    }

    pub fn from_rows<'a>(
        rows: impl IntoIterator<Item = (Category, &'a [(&'a str, u8)])>,
    ) -> Result<Self, TableError> {
        let mut options: BTreeMap<Category, Vec<(String, u8)>> = BTreeMap::new();

        for (category, scored_options) in rows {
            let entries = options.entry(category).or_default();
            for (option, score) in scored_options {
                if entries.iter().any(|(existing, _)| existing == option) {
                    return Err(TableError::DuplicateOption {
                        category: category.label(),
                        option: (*option).to_string(),
                    });
                }
                if !(1..=4).contains(score) {
                    return Err(TableError::ScoreOutOfRange {
                        category: category.label(),
                        option: (*option).to_string(),
                        score: *score,
                    });
                }
                if option.contains(',') || option.contains('\n') || option.contains('\r') {
                    return Err(TableError::UnsafeOptionText {
                        category: category.label(),
                        option: (*option).to_string(),
                    });
                }
                entries.push(((*option).to_string(), *score));
            }
        }

        Ok(Self { options })
    }

    pub fn score(&self, category: Category, option: &str) -> Result<u8, TableError> {
        self.options
            .get(&category)
            .and_then(|entries| {
                entries
                    .iter()
                    .find(|(candidate, _)| candidate == option)
                    .map(|(_, score)| *score)
            })
            .ok_or_else(|| TableError::UnknownOption {
                category: category.label(),
                option: option.to_string(),
            })
    }

    /// Scored options for one category, in display order.
    pub fn options(&self, category: Category) -> &[(String, u8)] {
        self.options
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
