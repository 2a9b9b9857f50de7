use serde::{Deserialize, Serialize};

/// One assessment dimension of the Braden questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    SensoryPerception,
    Moisture,
    Activity,
    Mobility,
    Nutrition,
    FrictionAndShear,
}

impl Category {
    pub fn ordered() -> [Category; 6] {
        [
            Category::SensoryPerception,
            Category::Moisture,
            Category::Activity,
            Category::Mobility,
            Category::Nutrition,
            Category::FrictionAndShear,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::SensoryPerception => "SensoryPerception",
            Category::Moisture => "Moisture",
            Category::Activity => "Activity",
            Category::Mobility => "Mobility",
            Category::Nutrition => "Nutrition",
            Category::FrictionAndShear => "FrictionAndShear",
        }
    }

    pub fn from_label(label: &str) -> Option<Category> {
        Category::ordered()
            .into_iter()
            .find(|category| category.label() == label)
    }
}

/// One chosen option for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub category: Category,
    pub option: String,
}

/// The user's current answers, at most one option per category.
///
/// Entries keep insertion order; re-choosing a category replaces the option
/// in place so the category keeps its position. Created empty, mutated per
/// choice, consumed on submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    entries: Vec<SelectionEntry>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn choose(&mut self, category: Category, option: impl Into<String>) {
        let option = option.into();
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.category == category)
        {
            Some(entry) => entry.option = option,
            None => self.entries.push(SelectionEntry { category, option }),
        }
    }

    pub fn chosen(&self, category: Category) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.option.as_str())
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<SelectionEntry> for Selection {
    fn from_iter<I: IntoIterator<Item = SelectionEntry>>(iter: I) -> Self {
        let mut selection = Selection::new();
        for entry in iter {
            selection.choose(entry.category, entry.option);
        }
        selection
    }
}
