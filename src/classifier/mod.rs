//! Multinomial Naive Bayes over a feature-selected vocabulary.
//!
//! Training runs in a fixed order: ingest documents into the [`Corpus`],
//! compute category priors, count term/category contingencies, keep each
//! category's top-k terms by MI or chi-squared, then estimate Laplace-smoothed
//! likelihoods over the selected terms. Every derived table is indexed by the
//! ranks of the ordered maps it was built from.

pub mod builder;
pub mod contingency;
pub mod corpus;
pub mod evaluate;
pub mod probability;
pub mod report;
pub mod select;

use std::borrow::Borrow;

use rayon::prelude::*;

use crate::classifier::corpus::Corpus;
use crate::classifier::evaluate::{CategoryScores, Evaluation, Outcome};
use crate::classifier::probability::{CategoryStats, ProbabilityTable};
use crate::classifier::report::{CategoryFeatures, CategoryPrior, LearnerSummary};
use crate::classifier::select::FeatureSelection;
use crate::config::{LearnerConfig, ScoringRule};
use crate::error::{LearnerError, Result};
use crate::text::{EnglishNormalizer, Normalizer};
use crate::utils::datastruct::map::OrderedMap;
use crate::utils::datastruct::queue::Queue;
use crate::utils::precision::Precision;

pub use builder::LearnerBuilder;
pub use corpus::Record;

/// A trained classifier.
///
/// Immutable once built: every query takes `&self`, so a learner can be shared
/// across threads and queried concurrently.
///
/// `Learner<N, Z>`:
/// - `N`: storage precision of the probability table (`f64` or `f32`)
/// - `Z`: text normalizer used for both training and queries
#[derive(Debug, Clone)]
pub struct Learner<N = f64, Z = EnglishNormalizer> {
    config: LearnerConfig,
    normalizer: Z,
    corpus: Corpus,
    stats: CategoryStats,
    selection: FeatureSelection,
    table: ProbabilityTable<N>,
}

impl Learner<f64, EnglishNormalizer> {
    /// Train on `records` with the English normalizer.
    ///
    /// # Examples
    /// ```
    /// use nb_feature_classifier::{Learner, LearnerConfig, Record, SelectionMethod};
    ///
    /// let records = [
    ///     Record::new("sports", "the team won the game"),
    ///     Record::new("finance", "the market rose today"),
    /// ];
    /// let config = LearnerConfig::new(SelectionMethod::MutualInformation, 2);
    /// let learner = Learner::build(&records, config).unwrap();
    /// assert_eq!(learner.selected_vocabulary_size(), 4);
    /// assert_eq!(learner.classify("the team lost"), "sports");
    /// ```
    pub fn build<I, R>(records: I, config: LearnerConfig) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: Borrow<Record>,
    {
        Self::build_with(records, config, EnglishNormalizer::new())
    }
}

impl<N, Z> Learner<N, Z>
where
    N: Precision,
    Z: Normalizer,
{
    pub fn build_with<I, R>(records: I, config: LearnerConfig, normalizer: Z) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: Borrow<Record>,
    {
        let mut builder = LearnerBuilder::with_normalizer(config, normalizer)?;
        for record in records {
            builder.learn_record(record.borrow())?;
        }
        builder.build()
    }

    /// Ranks of the selected terms in `text`, in text order; other terms are dropped.
    fn selected_ranks(&self, text: &str) -> Queue<usize> {
        let selected = &self.selection.selected;
        self.normalizer
            .normalize(text)
            .iter()
            .filter(|term| selected.contains(term.as_str()))
            .map(|term| selected.rank(term.as_str()))
            .collect()
    }

    /// Score of every category for `text`, in category rank order.
    pub fn category_scores(&self, text: &str) -> CategoryScores<'_> {
        let ranks = self.selected_ranks(text);
        let list = self
            .stats
            .labels
            .iter()
            .enumerate()
            .map(|(c, label)| {
                let base = match self.config.scoring {
                    ScoringRule::Likelihood => 0.0,
                    ScoringRule::PriorAndLikelihood => self.stats.priors[c].ln(),
                };
                let score = ranks
                    .iter()
                    .fold(base, |acc, &t| acc + self.table.log_likelihood(t, c));
                (label.as_str(), score)
            })
            .collect();
        CategoryScores::new(list)
    }

    /// Most likely category for `text`.
    ///
    /// Ties go to the lowest-ranked category. A text with no selected terms
    /// scores equally everywhere under [`ScoringRule::Likelihood`] and lands in
    /// the first category.
    pub fn classify(&self, text: &str) -> &str {
        self.category_scores(text)
            .best()
            .map(|(category, _)| category)
            .unwrap_or_else(|| self.stats.labels.first().map(String::as_str).unwrap_or_default())
    }

    /// `P(term | category)` for a raw term.
    ///
    /// The term is normalized first. Terms outside the selected vocabulary get
    /// `1 / (|vocabulary| + token_total(category))`, as does input that
    /// normalizes to more than one term.
    pub fn posterior_probability(&self, term: &str, category: &str) -> Result<f64> {
        let c = self.corpus.category_rank(category)?;
        let selected = &self.selection.selected;
        if let Some(term) = self.normalizer.normalize_term(term) {
            if selected.contains(term.as_str()) {
                let p = self.table.likelihood(selected.rank(term.as_str()), c);
                if let Some(p) = p {
                    return Ok(p.into());
                }
            }
        }
        let total = self.table.token_total(c).unwrap_or(0);
        Ok(1.0 / (self.corpus.vocabulary().len() as f64 + total as f64))
    }

    /// Classify labeled records in parallel; a guess is correct when it is
    /// any of the record's labels.
    pub fn evaluate<R>(&self, records: &[R]) -> Evaluation
    where
        R: Borrow<Record> + Sync,
        Z: Sync,
    {
        let outcomes = records
            .par_iter()
            .map(|record| {
                let record = record.borrow();
                let predicted = self.classify(&record.text);
                let expected: Vec<String> =
                    record.labels().into_iter().map(str::to_string).collect();
                Outcome {
                    correct: expected.iter().any(|label| label == predicted),
                    predicted: predicted.to_string(),
                    expected,
                }
            })
            .collect();
        Evaluation::from_outcomes(outcomes)
    }

    pub fn summary(&self) -> LearnerSummary {
        let priors = self
            .stats
            .labels
            .iter()
            .enumerate()
            .map(|(c, label)| CategoryPrior {
                category: label.clone(),
                documents: self.stats.document_counts[c],
                prior: self.stats.priors[c],
                token_total: self.table.token_total(c).unwrap_or(0),
            })
            .collect();
        let category_features = self
            .selection
            .category_features
            .iter()
            .map(|(category, features)| CategoryFeatures {
                category: category.clone(),
                features: features.iter().cloned().collect(),
            })
            .collect();
        LearnerSummary {
            selection: self.config.selection,
            features_per_category: self.config.features_per_category,
            scoring: self.config.scoring,
            record_count: self.record_count(),
            document_count: self.document_count(),
            category_count: self.category_count(),
            vocabulary_size: self.vocabulary_size(),
            selected_vocabulary_size: self.selected_vocabulary_size(),
            priors,
            category_features,
            selected_vocabulary: self.selection.selected.keys().cloned().collect(),
        }
    }
}

/// Read-only accessors.
impl<N, Z> Learner<N, Z>
where
    N: Precision,
{
    #[inline]
    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    #[inline]
    pub fn normalizer(&self) -> &Z {
        &self.normalizer
    }

    #[inline]
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    #[inline]
    pub fn record_count(&self) -> usize {
        self.corpus.record_count()
    }

    #[inline]
    pub fn document_count(&self) -> usize {
        self.corpus.document_count()
    }

    #[inline]
    pub fn category_count(&self) -> usize {
        self.stats.len()
    }

    /// Categories in rank order.
    #[inline]
    pub fn categories(&self) -> &[String] {
        &self.stats.labels
    }

    #[inline]
    pub fn vocabulary(&self) -> &OrderedMap<String, u64> {
        self.corpus.vocabulary()
    }

    #[inline]
    pub fn vocabulary_size(&self) -> usize {
        self.corpus.vocabulary().len()
    }

    #[inline]
    pub fn selected_vocabulary(&self) -> &OrderedMap<String, u64> {
        &self.selection.selected
    }

    #[inline]
    pub fn selected_vocabulary_size(&self) -> usize {
        self.selection.selected.len()
    }

    /// `(category, prior)` in rank order.
    pub fn priors(&self) -> impl Iterator<Item = (&str, f64)> {
        self.stats
            .labels
            .iter()
            .map(String::as_str)
            .zip(self.stats.priors.iter().copied())
    }

    pub fn prior(&self, category: &str) -> Result<f64> {
        let c = self.corpus.category_rank(category)?;
        Ok(self.stats.priors[c])
    }

    /// The category's own selected terms, best first.
    pub fn category_features(&self, category: &str) -> Result<&Queue<String>> {
        self.selection.features_of(category)
    }

    /// Selected-term occurrences in the category; the smoothing denominator minus `|selected|`.
    pub fn token_total(&self, category: &str) -> Result<u64> {
        let c = self.corpus.category_rank(category)?;
        self.table
            .token_total(c)
            .ok_or_else(|| LearnerError::UnknownCategory {
                category: category.to_string(),
            })
    }

    #[inline]
    pub fn probability_table(&self) -> &ProbabilityTable<N> {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::SelectionMethod;
    use crate::text::WhitespaceNormalizer;

    fn scenario(method: SelectionMethod) -> Learner {
        let records = vec![
            Record::new("sports", "the team won the game"),
            Record::new("finance", "the market rose today"),
        ];
        Learner::build(&records, LearnerConfig::new(method, 2)).unwrap()
    }

    #[test]
    fn two_document_scenario() {
        for method in [SelectionMethod::MutualInformation, SelectionMethod::ChiSquared] {
            let learner = scenario(method);
            assert_eq!(learner.document_count(), 2);
            assert_eq!(learner.category_count(), 2);
            assert_eq!(learner.vocabulary_size(), 6);
            assert_eq!(learner.selected_vocabulary_size(), 4);

            let scores = learner.category_scores("the team lost");
            let sports = scores.list.iter().find(|(c, _)| *c == "sports").unwrap().1;
            let finance = scores.list.iter().find(|(c, _)| *c == "finance").unwrap().1;
            assert!(sports > finance);
            assert_eq!(learner.classify("the team lost"), "sports");
            assert_eq!(learner.classify("market prices rose"), "finance");
        }
    }

    #[test]
    fn scenario_features_and_probabilities() {
        let learner = scenario(SelectionMethod::MutualInformation);
        let sports: Vec<&String> = learner.category_features("sports").unwrap().iter().collect();
        assert_eq!(sports, vec!["game", "team"]);
        let finance: Vec<&String> = learner.category_features("finance").unwrap().iter().collect();
        assert_eq!(finance, vec!["market", "rose"]);

        // "won" was not selected, so sports only counts game + team
        assert_eq!(learner.token_total("sports").unwrap(), 2);
        assert_eq!(learner.posterior_probability("team", "sports").unwrap(), 2.0 / 6.0);
        assert_eq!(learner.posterior_probability("teams", "finance").unwrap(), 1.0 / 6.0);
    }

    #[test]
    fn unseen_term_uses_global_vocabulary() {
        let learner = scenario(SelectionMethod::MutualInformation);
        let expected = 1.0 / (6.0 + 2.0);
        assert_eq!(learner.posterior_probability("unseen_term", "sports").unwrap(), expected);
        assert_eq!(learner.posterior_probability("zebra", "sports").unwrap(), expected);
        // known but unselected
        assert_eq!(learner.posterior_probability("won", "sports").unwrap(), expected);
        // both halves are selected, the compound is not one term
        assert_eq!(learner.posterior_probability("team-game", "sports").unwrap(), expected);
    }

    #[test]
    fn unknown_category_is_an_error() {
        let learner = scenario(SelectionMethod::MutualInformation);
        assert_eq!(
            learner.posterior_probability("team", "weather"),
            Err(LearnerError::UnknownCategory {
                category: "weather".to_string()
            })
        );
        assert!(learner.prior("weather").is_err());
        assert!(learner.category_features("weather").is_err());
    }

    #[test]
    fn no_selected_terms_falls_back_to_first_category() {
        let learner = scenario(SelectionMethod::MutualInformation);
        assert_eq!(learner.categories()[0], "finance");
        assert_eq!(learner.classify(""), "finance");
        assert_eq!(learner.classify("the weather is nice"), "finance");
        assert!(learner.category_scores("nothing").list.iter().all(|(_, s)| *s == 0.0));

        let config = LearnerConfig::new(SelectionMethod::MutualInformation, 2)
            .with_scoring(ScoringRule::PriorAndLikelihood);
        let records = [
            Record::new("sports", "the team won the game"),
            Record::new("finance", "the market rose today"),
        ];
        let learner = Learner::build(&records, config).unwrap();
        assert_eq!(learner.classify("nothing relevant"), "finance");
        assert_eq!(learner.classify("team"), "sports");
    }

    fn larger_corpus() -> Vec<Record> {
        vec![
            Record::new("grain", "wheat exports rose as the grain harvest improved"),
            Record::new("grain", "corn and wheat prices fell on large harvest"),
            Record::new("grain", "grain traders expect a record wheat crop"),
            Record::new("crude", "oil prices rose after the opec meeting"),
            Record::new("crude", "crude oil output cut by opec members"),
            Record::new("crude", "refinery demand lifted crude prices"),
            Record::multi(["grain", "ship"], "wheat cargo ship delayed at port"),
            Record::new("ship", "port strike delays cargo vessels"),
            Record::new("ship", "shipping rates for cargo vessels climbed"),
        ]
    }

    #[test]
    fn table_is_rank_aligned_and_sums_match() {
        for method in [SelectionMethod::MutualInformation, SelectionMethod::ChiSquared] {
            let learner = Learner::build(larger_corpus(), LearnerConfig::new(method, 3)).unwrap();
            let selected = learner.selected_vocabulary();
            let table = learner.probability_table();
            assert_eq!(table.num_terms(), selected.len());
            assert_eq!(table.num_categories(), learner.category_count());

            for (t, term) in selected.keys().enumerate() {
                assert_eq!(selected.rank(term.as_str()), t);
                for c in 0..learner.category_count() {
                    let p = table.likelihood(t, c).unwrap();
                    assert!(p > 0.0 && p < 1.0);
                }
            }

            for (c, category) in learner.categories().iter().enumerate() {
                let docs = learner.corpus().documents(category).unwrap();
                let counted: u64 = docs
                    .iter()
                    .flat_map(|d| d.iter())
                    .filter(|(term, _)| selected.contains(*term))
                    .map(|(_, n)| u64::from(n))
                    .sum();
                assert_eq!(learner.token_total(category).unwrap(), counted);
                assert_eq!(table.token_total(c), Some(counted));
            }
        }
    }

    #[test]
    fn multi_label_records_count_per_label() {
        let config = LearnerConfig::new(SelectionMethod::ChiSquared, 3);
        let learner = Learner::build(larger_corpus(), config).unwrap();
        assert_eq!(learner.record_count(), 9);
        assert_eq!(learner.document_count(), 10);
        assert_eq!(learner.prior("grain").unwrap(), 0.4);
        let total: f64 = learner.priors().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn classify_is_idempotent_and_shareable() {
        let config = LearnerConfig::new(SelectionMethod::MutualInformation, 4);
        let learner = Arc::new(Learner::build(larger_corpus(), config).unwrap());
        let text = "opec oil prices and wheat harvest";
        let first = learner.classify(text).to_string();
        assert_eq!(learner.classify(text), first);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let learner = Arc::clone(&learner);
                std::thread::spawn(move || learner.classify(text).to_string())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), first);
        }
    }

    #[test]
    fn evaluates_held_out_records() {
        let config = LearnerConfig::new(SelectionMethod::ChiSquared, 4);
        let learner = Learner::build(larger_corpus(), config).unwrap();
        let test = vec![
            Record::new("crude", "opec crude oil"),
            Record::new("grain", "wheat harvest"),
            Record::multi(["ship", "grain"], "cargo vessels at port"),
        ];
        let eval = learner.evaluate(&test);
        assert_eq!(eval.evaluated(), 3);
        assert_eq!(eval.correct, 3);
        assert_eq!(eval.accuracy(), 1.0);
        assert_eq!(eval.outcomes[0].predicted, "crude");
    }

    #[test]
    fn summary_reports_counts() {
        let learner = scenario(SelectionMethod::MutualInformation);
        let summary = learner.summary();
        assert_eq!(summary.record_count, 2);
        assert_eq!(summary.vocabulary_size, 6);
        assert_eq!(summary.selected_vocabulary_size, 4);
        assert_eq!(summary.priors[1].category, "sports");
        assert_eq!(summary.priors[1].prior, 0.5);
        assert_eq!(summary.category_features[1].features, vec!["game", "team"]);
        assert_eq!(summary.selected_vocabulary, vec!["game", "market", "rose", "team"]);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["selection"], "mutual-information");
        assert_eq!(json["priors"][0]["category"], "finance");
        assert!(summary.to_string().contains("Selected vocabulary: 4"));
    }

    #[test]
    fn empty_and_invalid_input() {
        let none: Vec<Record> = Vec::new();
        assert!(matches!(
            Learner::build(&none, LearnerConfig::default()),
            Err(LearnerError::InvalidConfiguration { .. })
        ));
        let records = [Record::new("a", "text")];
        let zero_k = LearnerConfig::new(SelectionMethod::ChiSquared, 0);
        assert!(Learner::build(&records, zero_k).is_err());
    }

    #[test]
    fn single_precision_table() {
        let records = larger_corpus();
        let config = LearnerConfig::new(SelectionMethod::MutualInformation, 3);
        let wide = Learner::build(&records, config.clone()).unwrap();
        let narrow: Learner<f32> =
            Learner::build_with(&records, config, EnglishNormalizer::new()).unwrap();
        assert_eq!(wide.selected_vocabulary_size(), narrow.selected_vocabulary_size());
        for text in ["opec crude oil", "wheat harvest", "cargo vessels at port"] {
            assert_eq!(wide.classify(text), narrow.classify(text));
        }
        let p64 = wide.posterior_probability("wheat", "grain").unwrap();
        let p32 = narrow.posterior_probability("wheat", "grain").unwrap();
        assert!((p64 - p32).abs() < 1e-6);
    }

    #[test]
    fn custom_normalizer() {
        let records = [
            Record::new("x", "alpha beta"),
            Record::new("y", "gamma delta"),
        ];
        let learner: Learner<f64, _> = Learner::build_with(
            &records,
            LearnerConfig::new(SelectionMethod::ChiSquared, 1),
            WhitespaceNormalizer,
        )
        .unwrap();
        // equal scores and category document counts: lowest vocabulary rank wins
        assert_eq!(learner.selected_vocabulary_size(), 2);
        assert!(learner.selected_vocabulary().contains("alpha"));
        assert!(learner.selected_vocabulary().contains("delta"));
        assert_eq!(learner.classify("Alpha!"), "x");
        assert_eq!(learner.classify("(delta)"), "y");
    }
}
