/// This crate is a text classifier: multinomial Naive Bayes over a vocabulary
/// reduced by mutual-information or chi-squared feature selection.
pub mod classifier;
pub mod config;
pub mod error;
pub mod text;
pub mod utils;

/// Trained classifier
/// The top-level struct of this crate. Built once from labeled records, then
/// queried read-only (`classify`, `category_scores`, `posterior_probability`,
/// `evaluate`, `summary`).
///
/// Internally, it holds:
/// - The corpus: documents grouped by category and the global vocabulary
/// - Category priors
/// - The selected vocabulary and each category's own top-k features
/// - A probability table indexed by selected-term rank and category rank
///
/// `Learner<N, Z>` has the following generic parameters:
/// - `N`: Probability table precision (`f64` or `f32`)
/// - `Z`: Text normalizer (e.g. `EnglishNormalizer`, `WhitespaceNormalizer`, a closure)
///
/// # Thread Safety
/// A built learner is never mutated and can be queried from many threads.
pub use classifier::Learner;

/// Incremental construction
/// Learn records one at a time, then `build()` runs feature selection and
/// probability estimation in one pass and yields a `Learner`.
pub use classifier::LearnerBuilder;

/// Labeled input record
/// One text with one or more category labels. A multi-label record becomes one
/// document per label.
pub use classifier::Record;

/// Construction parameters
/// Selection method, features per category (`k`) and the scoring rule used by
/// `classify`.
pub use config::{LearnerConfig, ScoringRule, SelectionMethod};

/// Reporting
/// `LearnerSummary` is a serializable snapshot of counts, priors and features.
/// `Evaluation` is the outcome of classifying a labeled test set.
pub use classifier::evaluate::{CategoryScores, Evaluation};
pub use classifier::report::{LearnerSummary, VocabularyListing};

/// Text normalization
/// The same normalizer turns training text and queries into terms.
pub use text::{EnglishNormalizer, Normalizer, WhitespaceNormalizer};

/// Ordered containers
/// `OrderedMap` is a red-black tree with rank/select; `MaxPQ` extracts top-k
/// items; `Queue` keeps insertion order.
pub use utils::datastruct::heap::MaxPQ;
pub use utils::datastruct::map::OrderedMap;
pub use utils::datastruct::queue::Queue;

pub use error::{LearnerError, Result, StructureError};
