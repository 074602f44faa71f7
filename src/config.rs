//! Learner configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LearnerError, Result};

pub const DEFAULT_FEATURES_PER_CATEGORY: usize = 50;

/// Statistic used to rank terms within a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMethod {
    /// Expected information (bits) a term's presence carries about category membership.
    #[default]
    MutualInformation,
    /// Pearson's chi-squared statistic of term presence against category membership.
    ChiSquared,
}

impl FromStr for SelectionMethod {
    type Err = LearnerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mi" | "m" | "mutual-information" => Ok(SelectionMethod::MutualInformation),
            "chi2" | "c" | "chi-squared" => Ok(SelectionMethod::ChiSquared),
            other => Err(LearnerError::invalid_config(format!(
                "unknown feature selection method `{other}` (expected `mi` or `chi2`)"
            ))),
        }
    }
}

impl fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMethod::MutualInformation => f.write_str("mutual-information"),
            SelectionMethod::ChiSquared => f.write_str("chi-squared"),
        }
    }
}

/// How `classify` turns per-category evidence into a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringRule {
    /// Sum of log-likelihoods of the selected terms only.
    #[default]
    Likelihood,
    /// Log-prior plus the log-likelihood sum.
    PriorAndLikelihood,
}

/// Parameters fixed at construction time.
///
/// # Examples
/// ```
/// use nb_feature_classifier::{LearnerConfig, SelectionMethod};
///
/// let config = LearnerConfig::parse("chi2", 10).unwrap();
/// assert_eq!(config.selection, SelectionMethod::ChiSquared);
/// assert!(LearnerConfig::parse("chi2", 0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    pub selection: SelectionMethod,
    /// `k`: how many terms each category contributes to the selected vocabulary
    pub features_per_category: usize,
    pub scoring: ScoringRule,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        LearnerConfig {
            selection: SelectionMethod::default(),
            features_per_category: DEFAULT_FEATURES_PER_CATEGORY,
            scoring: ScoringRule::default(),
        }
    }
}

impl LearnerConfig {
    pub fn new(selection: SelectionMethod, features_per_category: usize) -> Self {
        LearnerConfig {
            selection,
            features_per_category,
            scoring: ScoringRule::default(),
        }
    }

    /// Build from loosely typed input, e.g. command line or config file values.
    pub fn parse(method: &str, features_per_category: i64) -> Result<Self> {
        let selection = method.parse()?;
        let k = usize::try_from(features_per_category).map_err(|_| {
            LearnerError::invalid_config(format!(
                "features per category must be positive, got {features_per_category}"
            ))
        })?;
        let config = Self::new(selection, k);
        config.validate()?;
        Ok(config)
    }

    pub fn with_scoring(mut self, scoring: ScoringRule) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.features_per_category == 0 {
            return Err(LearnerError::invalid_config(
                "features per category must be positive, got 0",
            ));
        }
        Ok(())
    }
}
