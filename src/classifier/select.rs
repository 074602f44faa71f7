use std::cmp::Ordering;

use rayon::prelude::*;
use tracing::debug;

use crate::classifier::contingency::{ContingencyCounts, ContingencyTable};
use crate::classifier::corpus::Corpus;
use crate::config::SelectionMethod;
use crate::error::{LearnerError, Result};
use crate::utils::datastruct::heap::MaxPQ;
use crate::utils::datastruct::map::OrderedMap;
use crate::utils::datastruct::queue::Queue;

impl SelectionMethod {
    /// Score a term against a category from raw contingency counts.
    /// The add-one correction is applied here.
    #[inline]
    pub fn score(self, counts: ContingencyCounts) -> f64 {
        let smoothed = counts.smoothed();
        match self {
            SelectionMethod::MutualInformation => mutual_information(smoothed),
            SelectionMethod::ChiSquared => chi_squared(smoothed),
        }
    }
}

/// Row/column sums of a 2x2 table.
struct Margins {
    n: f64,
    /// contains term
    n1s: f64,
    /// lacks term
    n0s: f64,
    /// in category
    ns1: f64,
    /// outside category
    ns0: f64,
}

impl Margins {
    fn of(c: &ContingencyCounts) -> Self {
        Margins {
            n: c.total() as f64,
            n1s: (c.n11 + c.n10) as f64,
            n0s: (c.n01 + c.n00) as f64,
            ns1: (c.n11 + c.n01) as f64,
            ns0: (c.n10 + c.n00) as f64,
        }
    }
}

/// Mutual information in bits. Expects every cell to be positive.
pub fn mutual_information(c: ContingencyCounts) -> f64 {
    let m = Margins::of(&c);
    let cell = |observed: u64, row: f64, col: f64| {
        let o = observed as f64;
        (o / m.n) * (o * m.n / (row * col)).log2()
    };
    // cells grouped by term row so that swapping category membership only
    // reorders operands of commutative additions
    (cell(c.n11, m.n1s, m.ns1) + cell(c.n10, m.n1s, m.ns0))
        + (cell(c.n01, m.n0s, m.ns1) + cell(c.n00, m.n0s, m.ns0))
}

/// Pearson's chi-squared with expected counts `row * col / N`.
pub fn chi_squared(c: ContingencyCounts) -> f64 {
    let m = Margins::of(&c);
    let cell = |observed: u64, row: f64, col: f64| {
        let expected = row * col / m.n;
        let diff = expected - observed as f64;
        diff * diff / expected
    };
    (cell(c.n11, m.n1s, m.ns1) + cell(c.n10, m.n1s, m.ns0))
        + (cell(c.n01, m.n0s, m.ns1) + cell(c.n00, m.n0s, m.ns0))
}

/// Priority of a term inside one category's ranking.
///
/// Higher score first; on equal scores the term found in more of the
/// category's own documents wins. Remaining ties fall back to the queue's
/// insertion order, which is vocabulary rank.
#[derive(Debug, Clone, Copy)]
pub struct FeatureScore {
    pub score: f64,
    pub docs_in_category: u64,
}

impl Ord for FeatureScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.docs_in_category.cmp(&other.docs_in_category))
    }
}

impl PartialOrd for FeatureScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FeatureScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FeatureScore {}

/// Outcome of feature selection.
#[derive(Debug, Clone, Default)]
pub struct FeatureSelection {
    /// union of every category's top-k, term -> global frequency
    pub selected: OrderedMap<String, u64>,
    /// per category, its own top-k in descending priority
    pub category_features: OrderedMap<String, Queue<String>>,
}

impl FeatureSelection {
    /// Rank the whole vocabulary for each category and keep the `k` best.
    pub fn select(
        corpus: &Corpus,
        table: &ContingencyTable,
        method: SelectionMethod,
        k: usize,
    ) -> Result<Self> {
        let vocabulary = corpus.vocabulary();
        let num_terms = vocabulary.len();

        let ranked: Vec<Vec<usize>> = (0..corpus.category_count())
            .into_par_iter()
            .map(|c| -> Result<Vec<usize>> {
                let mut pq = MaxPQ::with_capacity(num_terms);
                for t in 0..num_terms {
                    let counts = table.counts(t, c)?;
                    pq.insert(
                        t,
                        FeatureScore {
                            score: method.score(counts),
                            docs_in_category: counts.n11,
                        },
                    );
                }
                let top = pq.take_top(k)?;
                Ok(top.into_iter().map(|(t, _)| t).collect())
            })
            .collect::<Result<Vec<_>>>()?;

        let mut selection = FeatureSelection::default();
        for (c, terms) in ranked.into_iter().enumerate() {
            let category = corpus.categories().select(c)?;
            let mut features = Queue::with_capacity(terms.len());
            for t in terms {
                let (term, &freq) = vocabulary.select_entry(t)?;
                selection.selected.put(term.clone(), freq);
                features.enqueue(term.clone());
            }
            debug!(category = %category, features = features.len(), "category features selected");
            selection.category_features.put(category.clone(), features);
        }
        Ok(selection)
    }

    pub fn features_of(&self, category: &str) -> Result<&Queue<String>> {
        self.category_features
            .get(category)
            .map_err(|_| LearnerError::UnknownCategory {
                category: category.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(n11: u64, n10: u64, n01: u64, n00: u64) -> ContingencyCounts {
        ContingencyCounts { n11, n10, n01, n00 }
    }

    #[test]
    fn independent_term_scores_zero() {
        // smoothing turns these into an all-3 table
        let c = counts(2, 2, 2, 2);
        assert!(SelectionMethod::MutualInformation.score(c).abs() < 1e-12);
        assert!(SelectionMethod::ChiSquared.score(c).abs() < 1e-12);
    }

    #[test]
    fn known_values() {
        // smoothed (2, 1, 1, 2), N = 6
        let c = counts(1, 0, 0, 1);
        let mi = SelectionMethod::MutualInformation.score(c);
        let expected_mi = (4.0 / 6.0) * (4.0f64 / 3.0).log2() + (2.0 / 6.0) * (2.0f64 / 3.0).log2();
        assert!((mi - expected_mi).abs() < 1e-12);
        // every expectation is 1.5, every |diff| is 0.5
        let chi = SelectionMethod::ChiSquared.score(c);
        assert!((chi - 4.0 * 0.25 / 1.5).abs() < 1e-12);
    }

    #[test]
    fn flipping_membership_keeps_score_bit_exact() {
        for method in [SelectionMethod::MutualInformation, SelectionMethod::ChiSquared] {
            assert_eq!(method.score(counts(1, 0, 0, 1)), method.score(counts(0, 1, 1, 0)));
            assert_eq!(method.score(counts(5, 2, 1, 9)), method.score(counts(2, 5, 9, 1)));
        }
    }

    #[test]
    fn stronger_association_scores_higher() {
        for method in [SelectionMethod::MutualInformation, SelectionMethod::ChiSquared] {
            let perfect = method.score(counts(10, 0, 0, 10));
            let partial = method.score(counts(6, 4, 4, 6));
            assert!(perfect > partial, "{method}");
        }
    }

    #[test]
    fn feature_score_breaks_ties_on_category_documents() {
        let a = FeatureScore { score: 0.5, docs_in_category: 1 };
        let b = FeatureScore { score: 0.5, docs_in_category: 0 };
        let c = FeatureScore { score: 0.7, docs_in_category: 0 };
        assert!(a > b);
        assert!(c > a);
        assert_eq!(a, FeatureScore { score: 0.5, docs_in_category: 1 });
    }

    #[test]
    fn perfectly_correlated_term_ranks_first() {
        let mut corpus = Corpus::new();
        for text in [["zinc", "price"], ["zinc", "metal"], ["zinc", "price"]] {
            corpus.add_record(&["metals"], &text).unwrap();
        }
        for text in [["price", "wheat"], ["crop", "wheat"], ["price", "rain"]] {
            corpus.add_record(&["grain"], &text).unwrap();
        }
        let table = ContingencyTable::compute(&corpus).unwrap();
        for method in [SelectionMethod::MutualInformation, SelectionMethod::ChiSquared] {
            let selection = FeatureSelection::select(&corpus, &table, method, 2).unwrap();
            let metals: Vec<&String> = selection.features_of("metals").unwrap().iter().collect();
            assert_eq!(metals[0], "zinc", "{method}");
            let grain: Vec<&String> = selection.features_of("grain").unwrap().iter().collect();
            assert_eq!(grain.len(), 2);
            assert!(selection.selected.contains("zinc"));
            assert_eq!(*selection.selected.get("zinc").unwrap(), 3);
        }
    }

    #[test]
    fn k_larger_than_vocabulary_takes_everything() {
        let mut corpus = Corpus::new();
        corpus.add_record(&["a"], &["x", "y"]).unwrap();
        corpus.add_record(&["b"], &["z"]).unwrap();
        let table = ContingencyTable::compute(&corpus).unwrap();
        let selection =
            FeatureSelection::select(&corpus, &table, SelectionMethod::ChiSquared, 100).unwrap();
        assert_eq!(selection.selected.len(), 3);
        assert_eq!(selection.features_of("a").unwrap().len(), 3);
        assert!(selection.features_of("c").is_err());
    }
}
