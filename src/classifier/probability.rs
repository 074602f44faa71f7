use rayon::prelude::*;

use crate::classifier::corpus::{Corpus, TermFrequency};
use crate::error::{LearnerError, Result, StructureError};
use crate::utils::datastruct::map::OrderedMap;
use crate::utils::precision::Precision;

/// Category labels in rank order with their document counts and priors.
#[derive(Debug, Clone)]
pub struct CategoryStats {
    pub labels: Vec<String>,
    pub document_counts: Vec<usize>,
    pub priors: Vec<f64>,
}

impl CategoryStats {
    pub fn compute(corpus: &Corpus) -> Result<Self> {
        let total = corpus.document_count();
        if total == 0 {
            return Err(LearnerError::invalid_config("no documents were learned"));
        }
        let mut stats = CategoryStats {
            labels: Vec::with_capacity(corpus.category_count()),
            document_counts: Vec::with_capacity(corpus.category_count()),
            priors: Vec::with_capacity(corpus.category_count()),
        };
        for (label, docs) in corpus.categories() {
            stats.labels.push(label.clone());
            stats.document_counts.push(docs.len());
            stats.priors.push(docs.len() as f64 / total as f64);
        }
        Ok(stats)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Smoothed `P(term | category)` over the selected vocabulary.
///
/// Row index is the term's rank in the selected vocabulary, column index the
/// category's rank in the corpus. Built once; never re-ranked.
#[derive(Debug, Clone)]
pub struct ProbabilityTable<N> {
    /// `[term * num_categories + category]`
    likelihoods: Vec<N>,
    /// occurrences of selected terms per category
    token_totals: Vec<u64>,
    num_terms: usize,
    num_categories: usize,
}

impl<N: Precision> ProbabilityTable<N> {
    /// Laplace estimate `(occurrences + 1) / (token_total + |selected|)`.
    pub fn compute(corpus: &Corpus, selected: &OrderedMap<String, u64>) -> Result<Self> {
        let num_terms = selected.len();
        let groups: Vec<&Vec<TermFrequency>> = corpus.categories().values().collect();
        let num_categories = groups.len();

        let columns = groups
            .par_iter()
            .map(|docs| -> std::result::Result<(Vec<u64>, u64), StructureError> {
                let mut occurrences = vec![0u64; num_terms];
                let mut total = 0u64;
                for doc in docs.iter() {
                    for (term, count) in doc.iter() {
                        if selected.contains(term) {
                            occurrences[selected.rank_of(term)?] += u64::from(count);
                            total += u64::from(count);
                        }
                    }
                }
                Ok((occurrences, total))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut likelihoods = vec![N::zero(); num_terms * num_categories];
        let mut token_totals = Vec::with_capacity(num_categories);
        for (c, (occurrences, total)) in columns.into_iter().enumerate() {
            let denominator = (total + num_terms as u64) as f64;
            for (t, occ) in occurrences.into_iter().enumerate() {
                likelihoods[t * num_categories + c] =
                    N::from_f64_lossy((occ + 1) as f64 / denominator);
            }
            token_totals.push(total);
        }

        Ok(ProbabilityTable {
            likelihoods,
            token_totals,
            num_terms,
            num_categories,
        })
    }

    /// `P(term | category)` by ranks.
    #[inline]
    pub fn likelihood(&self, term: usize, category: usize) -> Option<N> {
        if term >= self.num_terms || category >= self.num_categories {
            return None;
        }
        Some(self.likelihoods[term * self.num_categories + category])
    }

    /// `ln P(term | category)`; ranks must be in range.
    #[inline]
    pub(crate) fn log_likelihood(&self, term: usize, category: usize) -> f64 {
        let p: f64 = self.likelihoods[term * self.num_categories + category].into();
        p.ln()
    }

    #[inline]
    pub fn token_total(&self, category: usize) -> Option<u64> {
        self.token_totals.get(category).copied()
    }

    #[inline]
    pub fn token_totals(&self) -> &[u64] {
        &self.token_totals
    }

    #[inline]
    pub fn num_terms(&self) -> usize {
        self.num_terms
    }

    #[inline]
    pub fn num_categories(&self) -> usize {
        self.num_categories
    }
}
