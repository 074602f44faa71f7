use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{LearnerError, Result};
use crate::utils::datastruct::map::OrderedMap;

/// One labeled source record.
///
/// A record with several labels is learned once per label; each label gets
/// its own document instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub categories: Vec<String>,
    pub text: String,
}

impl Record {
    pub fn new(category: impl Into<String>, text: impl Into<String>) -> Self {
        Record {
            categories: vec![category.into()],
            text: text.into(),
        }
    }

    pub fn multi<I, S>(categories: I, text: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Record {
            categories: categories.into_iter().map(Into::into).collect(),
            text: text.into(),
        }
    }

    /// Labels with surrounding whitespace trimmed, empties and duplicates removed,
    /// first occurrence order kept.
    pub fn labels(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.categories.len());
        for label in self.categories.iter().map(|c| c.trim()) {
            if !label.is_empty() && !out.contains(&label) {
                out.push(label);
            }
        }
        out
    }
}

/// Term counts of a single document.
///
/// Terms keep first-seen order; `total_term_count` is the sum of all counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    term_count: IndexMap<String, u32>,
    total_term_count: u64,
}

impl TermFrequency {
    pub fn new() -> Self {
        TermFrequency {
            term_count: IndexMap::new(),
            total_term_count: 0,
        }
    }

    #[inline]
    pub fn add_term(&mut self, term: &str) -> &mut Self {
        if let Some(count) = self.term_count.get_mut(term) {
            *count += 1;
        } else {
            self.term_count.insert(term.to_string(), 1);
        }
        self.total_term_count += 1;
        self
    }

    pub fn add_terms<T>(&mut self, terms: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for term in terms {
            self.add_term(term.as_ref());
        }
        self
    }

    #[inline]
    pub fn term_count(&self, term: &str) -> u32 {
        self.term_count.get(term).copied().unwrap_or(0)
    }

    #[inline]
    pub fn contains_term(&self, term: &str) -> bool {
        self.term_count.contains_key(term)
    }

    /// number of distinct terms
    #[inline]
    pub fn term_num(&self) -> usize {
        self.term_count.len()
    }

    /// number of term occurrences
    #[inline]
    pub fn term_sum(&self) -> u64 {
        self.total_term_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.term_count.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.term_count.iter().map(|(t, &c)| (t.as_str(), c))
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.term_count.keys().map(String::as_str)
    }
}

impl<T: AsRef<str>> FromIterator<T> for TermFrequency {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tf = TermFrequency::new();
        for term in iter {
            tf.add_term(term.as_ref());
        }
        tf
    }
}

/// Documents grouped by category, plus the global vocabulary.
///
/// Categories and vocabulary terms are kept in lexicographic order; their
/// ranks in these maps are the row/column indices used by every derived
/// table. The corpus only grows while a learner is being built and is frozen
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    categories: OrderedMap<String, Vec<TermFrequency>>,
    vocabulary: OrderedMap<String, u64>,
    record_count: usize,
    document_count: usize,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `document` under `category`, creating the category on first use.
    pub fn add_document(&mut self, category: &str, document: TermFrequency) {
        for (term, count) in document.iter() {
            *self.vocabulary.get_or_insert_with(term.to_string(), || 0) += u64::from(count);
        }
        self.categories
            .get_or_insert_with(category.to_string(), Vec::new)
            .push(document);
        self.document_count += 1;
    }

    /// Learn one source record: one document per distinct label.
    pub fn add_record<T>(&mut self, labels: &[&str], terms: &[T]) -> Result<()>
    where
        T: AsRef<str>,
    {
        if labels.iter().any(|label| label.is_empty()) {
            return Err(LearnerError::invalid_config("category label is empty"));
        }
        let mut unique: Vec<&str> = Vec::with_capacity(labels.len());
        for &label in labels {
            if !unique.contains(&label) {
                unique.push(label);
            }
        }
        let (last, rest) = unique
            .split_last()
            .ok_or_else(|| LearnerError::invalid_config("record has no category label"))?;
        let mut document = TermFrequency::new();
        document.add_terms(terms);
        for label in rest {
            self.add_document(label, document.clone());
        }
        self.add_document(last, document);
        self.record_count += 1;
        Ok(())
    }

    #[inline]
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Document instances, counting a multi-label record once per label.
    #[inline]
    pub fn document_count(&self) -> usize {
        self.document_count
    }

    #[inline]
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    #[inline]
    pub fn vocabulary(&self) -> &OrderedMap<String, u64> {
        &self.vocabulary
    }

    #[inline]
    pub fn categories(&self) -> &OrderedMap<String, Vec<TermFrequency>> {
        &self.categories
    }

    pub fn category_rank(&self, category: &str) -> Result<usize> {
        self.categories
            .rank_of(category)
            .map_err(|_| LearnerError::UnknownCategory {
                category: category.to_string(),
            })
    }

    pub fn documents(&self, category: &str) -> Result<&[TermFrequency]> {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .map_err(|_| LearnerError::UnknownCategory {
                category: category.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_frequency_counts() {
        let mut tf = TermFrequency::new();
        tf.add_terms(&["oil", "price", "oil"]);
        assert_eq!(tf.term_count("oil"), 2);
        assert_eq!(tf.term_count("gas"), 0);
        assert_eq!(tf.term_num(), 2);
        assert_eq!(tf.term_sum(), 3);
        assert_eq!(tf.terms().collect::<Vec<_>>(), vec!["oil", "price"]);
        assert!(tf.contains_term("price"));
    }

    #[test]
    fn record_labels_are_cleaned() {
        let r = Record::multi([" grain", "corn", "", "grain "], "text");
        assert_eq!(r.labels(), vec!["grain", "corn"]);
        assert_eq!(Record::new("earn", "x").labels(), vec!["earn"]);
    }

    #[test]
    fn multi_label_record_expands_per_label() {
        let mut corpus = Corpus::new();
        corpus.add_record(&["grain", "corn"], &["wheat", "crop", "wheat"]).unwrap();
        corpus.add_record(&["grain"], &["rice"]).unwrap();

        assert_eq!(corpus.record_count(), 2);
        assert_eq!(corpus.document_count(), 3);
        assert_eq!(corpus.category_count(), 2);
        assert_eq!(corpus.documents("grain").unwrap().len(), 2);
        assert_eq!(corpus.documents("corn").unwrap().len(), 1);
        // vocabulary counts every document instance
        assert_eq!(*corpus.vocabulary().get("wheat").unwrap(), 4);
        assert_eq!(*corpus.vocabulary().get("rice").unwrap(), 1);
        assert_eq!(corpus.category_rank("corn").unwrap(), 0);
        assert_eq!(corpus.category_rank("grain").unwrap(), 1);
        assert!(matches!(
            corpus.category_rank("ship"),
            Err(LearnerError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn record_without_label_is_rejected() {
        let mut corpus = Corpus::new();
        assert!(corpus.add_record::<&str>(&[], &["x"]).is_err());
        assert!(corpus.add_record(&["ok", ""], &["x"]).is_err());
        assert_eq!(corpus.document_count(), 0);
    }

    #[test]
    fn repeated_labels_count_once() {
        let mut corpus = Corpus::new();
        corpus.add_record(&["a", "b", "a"], &["x", "y"]).unwrap();
        assert_eq!(corpus.record_count(), 1);
        assert_eq!(corpus.document_count(), 2);
        assert_eq!(corpus.category_count(), 2);
        assert_eq!(*corpus.vocabulary().get("x").unwrap(), 2);
    }
}
