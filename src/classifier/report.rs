use std::fmt;

use serde::Serialize;

use crate::config::{ScoringRule, SelectionMethod};
use crate::utils::datastruct::map::OrderedMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPrior {
    pub category: String,
    pub documents: usize,
    pub prior: f64,
    /// occurrences of selected terms in the category
    pub token_total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryFeatures {
    pub category: String,
    pub features: Vec<String>,
}

/// Read-only snapshot of a built learner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearnerSummary {
    pub selection: SelectionMethod,
    pub features_per_category: usize,
    pub scoring: ScoringRule,
    pub record_count: usize,
    pub document_count: usize,
    pub category_count: usize,
    pub vocabulary_size: usize,
    pub selected_vocabulary_size: usize,
    pub priors: Vec<CategoryPrior>,
    pub category_features: Vec<CategoryFeatures>,
    /// ascending; left out of the text rendering, see [`VocabularyListing`]
    pub selected_vocabulary: Vec<String>,
}

impl fmt::Display for LearnerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Records:            {}", self.record_count)?;
        writeln!(f, "Documents:          {}", self.document_count)?;
        writeln!(f, "Categories:         {}", self.category_count)?;
        writeln!(f, "Vocabulary:         {}", self.vocabulary_size)?;
        writeln!(
            f,
            "Selected vocabulary: {} ({}, k = {})",
            self.selected_vocabulary_size, self.selection, self.features_per_category
        )?;
        writeln!(f)?;
        writeln!(f, "Priors:")?;
        for p in &self.priors {
            writeln!(
                f,
                "  {:<24} {:>10.6}  ({} documents, {} tokens)",
                p.category, p.prior, p.documents, p.token_total
            )?;
        }
        writeln!(f)?;
        write!(f, "Features:")?;
        for c in &self.category_features {
            write!(f, "\n  {}: {}", c.category, c.features.join(" "))?;
        }
        Ok(())
    }
}

/// Terms of a vocabulary, fixed number per line, ascending.
pub struct VocabularyListing<'a> {
    vocabulary: &'a OrderedMap<String, u64>,
    per_line: usize,
}

impl<'a> VocabularyListing<'a> {
    pub fn new(vocabulary: &'a OrderedMap<String, u64>) -> Self {
        VocabularyListing {
            vocabulary,
            per_line: 15,
        }
    }

    pub fn per_line(mut self, n: usize) -> Self {
        self.per_line = n.max(1);
        self
    }
}

impl fmt::Display for VocabularyListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.vocabulary.keys().enumerate() {
            if i > 0 {
                f.write_str(if i % self.per_line == 0 { "\n" } else { " " })?;
            }
            f.write_str(term)?;
        }
        Ok(())
    }
}
