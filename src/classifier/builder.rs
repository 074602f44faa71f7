use std::marker::PhantomData;
use std::time::Instant;

use tracing::{debug, info};

use crate::classifier::contingency::ContingencyTable;
use crate::classifier::corpus::{Corpus, Record};
use crate::classifier::probability::{CategoryStats, ProbabilityTable};
use crate::classifier::select::FeatureSelection;
use crate::classifier::Learner;
use crate::config::LearnerConfig;
use crate::error::{LearnerError, Result};
use crate::text::{EnglishNormalizer, Normalizer};
use crate::utils::precision::Precision;

/// Collects labeled text, then runs the training stages once.
///
/// `build` consumes the builder, so a learner can never observe a corpus that
/// is still growing.
///
/// # Examples
/// ```
/// use nb_feature_classifier::{LearnerBuilder, LearnerConfig, SelectionMethod};
///
/// let config = LearnerConfig::new(SelectionMethod::ChiSquared, 5);
/// let mut builder = LearnerBuilder::new(config).unwrap();
/// builder.learn("sports", "The team won the game").unwrap();
/// builder.learn("finance", "The market rose today").unwrap();
/// let learner = builder.build().unwrap();
/// assert_eq!(learner.classify("a great game for the team"), "sports");
/// ```
#[derive(Debug, Clone)]
pub struct LearnerBuilder<N = f64, Z = EnglishNormalizer> {
    config: LearnerConfig,
    normalizer: Z,
    corpus: Corpus,
    _marker: PhantomData<N>,
}

impl LearnerBuilder<f64, EnglishNormalizer> {
    pub fn new(config: LearnerConfig) -> Result<Self> {
        Self::with_normalizer(config, EnglishNormalizer::new())
    }
}

impl<N, Z> LearnerBuilder<N, Z>
where
    N: Precision,
    Z: Normalizer,
{
    /// Validates `config` up front so a bad `k` fails before any ingestion.
    pub fn with_normalizer(config: LearnerConfig, normalizer: Z) -> Result<Self> {
        config.validate()?;
        Ok(LearnerBuilder {
            config,
            normalizer,
            corpus: Corpus::new(),
            _marker: PhantomData,
        })
    }

    /// Learn one single-label record.
    pub fn learn(&mut self, category: &str, text: &str) -> Result<&mut Self> {
        let terms = self.normalizer.normalize(text);
        self.corpus.add_record(&[category.trim()], &terms)?;
        Ok(self)
    }

    /// Learn a record under each of its labels.
    pub fn learn_record(&mut self, record: &Record) -> Result<&mut Self> {
        let labels = record.labels();
        let terms = self.normalizer.normalize(&record.text);
        self.corpus.add_record(&labels, &terms)?;
        Ok(self)
    }

    /// Learn already normalized terms, bypassing the normalizer.
    pub fn learn_terms<T>(&mut self, category: &str, terms: &[T]) -> Result<&mut Self>
    where
        T: AsRef<str>,
    {
        self.corpus.add_record(&[category.trim()], terms)?;
        Ok(self)
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// priors -> contingency -> selection -> token totals and likelihoods
    pub fn build(self) -> Result<Learner<N, Z>> {
        let started = Instant::now();
        let LearnerBuilder {
            config,
            normalizer,
            corpus,
            ..
        } = self;

        let stats = CategoryStats::compute(&corpus)?;
        if corpus.vocabulary().is_empty() {
            return Err(LearnerError::invalid_config("no terms survived normalization"));
        }
        info!(
            records = corpus.record_count(),
            documents = corpus.document_count(),
            categories = corpus.category_count(),
            vocabulary = corpus.vocabulary().len(),
            "corpus ingested"
        );
        for (label, prior) in stats.labels.iter().zip(&stats.priors) {
            debug!(category = %label, prior, "category prior");
        }

        let contingency = ContingencyTable::compute(&corpus)?;
        info!(elapsed_ms = started.elapsed().as_millis() as u64, "contingency table computed");

        let selection = FeatureSelection::select(
            &corpus,
            &contingency,
            config.selection,
            config.features_per_category,
        )?;
        info!(
            method = %config.selection,
            k = config.features_per_category,
            selected = selection.selected.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "features selected"
        );

        let table = ProbabilityTable::<N>::compute(&corpus, &selection.selected)?;
        info!(
            cells = table.num_terms() * table.num_categories(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "learner built"
        );

        Ok(Learner {
            config,
            normalizer,
            corpus,
            stats,
            selection,
            table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectionMethod;
    use crate::text::WhitespaceNormalizer;

    #[test]
    fn zero_k_fails_before_ingestion() {
        let err = LearnerBuilder::new(LearnerConfig::new(SelectionMethod::MutualInformation, 0))
            .unwrap_err();
        assert!(matches!(err, LearnerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn empty_builder_cannot_build() {
        let builder = LearnerBuilder::new(LearnerConfig::default()).unwrap();
        assert!(matches!(
            builder.build(),
            Err(LearnerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn stop_word_only_corpus_cannot_build() {
        let mut builder = LearnerBuilder::new(LearnerConfig::default()).unwrap();
        builder.learn("a", "the of and").unwrap();
        builder.learn("b", "is was").unwrap();
        assert_eq!(builder.corpus().document_count(), 2);
        assert!(builder.corpus().vocabulary().is_empty());
        assert!(matches!(
            builder.build(),
            Err(LearnerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn blank_label_is_rejected() {
        let mut builder = LearnerBuilder::new(LearnerConfig::default()).unwrap();
        assert!(builder.learn_record(&Record::multi(["", "  "], "oil")).is_err());
        assert_eq!(builder.corpus().document_count(), 0);
    }

    #[test]
    fn learn_terms_skips_normalization() {
        let mut builder: LearnerBuilder<f64, _> =
            LearnerBuilder::with_normalizer(LearnerConfig::default(), WhitespaceNormalizer)
                .unwrap();
        builder
            .learn_terms("a", &["The", "the"])
            .unwrap()
            .learn("b", "The end")
            .unwrap();
        let vocab = builder.corpus().vocabulary();
        assert_eq!(*vocab.get("The").unwrap(), 1);
        assert_eq!(*vocab.get("the").unwrap(), 2);
        assert_eq!(builder.corpus().record_count(), 2);
    }
}
