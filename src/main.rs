//! nbclassify: train a Naive Bayes text classifier from a labeled file and
//! report on it.
//!
//! Input files hold one record per line: `labels<TAB>text`, where `labels` is
//! a comma-separated list of categories.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use nb_feature_classifier::{
    EnglishNormalizer, Learner, LearnerConfig, Record, ScoringRule, VocabularyListing,
};

#[derive(Parser)]
#[command(
    name = "nbclassify",
    version,
    about = "Naive Bayes text classifier with feature selection"
)]
struct Cli {
    /// Training file (`labels<TAB>text` per line).
    #[arg(long)]
    train: PathBuf,

    /// Held-out file in the same format; prints accuracy.
    #[arg(long)]
    test: Option<PathBuf>,

    /// Feature selection method: mi or chi2.
    #[arg(long, short, default_value = "mi")]
    method: String,

    /// Features kept per category.
    #[arg(long = "features", short = 'k', default_value = "50", allow_negative_numbers = true)]
    k: i64,

    /// Add the log-prior to each category score.
    #[arg(long)]
    prior: bool,

    /// Keep words unstemmed.
    #[arg(long)]
    no_stem: bool,

    /// Skip the first line of every input file.
    #[arg(long)]
    skip_header: bool,

    /// Print the selected vocabulary.
    #[arg(long)]
    vocab: bool,

    /// Print the summary as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Texts to classify after training.
    #[arg(long = "classify", value_name = "TEXT")]
    queries: Vec<String>,
}

/// Parse `labels<TAB>text` lines; malformed rows are skipped with a warning.
fn load_records(path: &Path, skip_header: bool) -> Result<Vec<Record>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut records = Vec::new();
    for (i, line) in content.lines().enumerate().skip(usize::from(skip_header)) {
        if line.trim().is_empty() {
            continue;
        }
        let Some((labels, text)) = line.split_once('\t') else {
            warn!(file = %path.display(), line = i + 1, "no tab separator, row skipped");
            continue;
        };
        let record = Record::multi(labels.split(','), text);
        if record.labels().is_empty() {
            warn!(file = %path.display(), line = i + 1, "no category label, row skipped");
            continue;
        }
        records.push(record);
    }
    info!(file = %path.display(), records = records.len(), "records loaded");
    Ok(records)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = LearnerConfig::parse(&cli.method, cli.k)?;
    if cli.prior {
        config = config.with_scoring(ScoringRule::PriorAndLikelihood);
    }

    let records = load_records(&cli.train, cli.skip_header)?;
    if records.is_empty() {
        bail!("no usable records in {}", cli.train.display());
    }

    let started = Instant::now();
    let normalizer = if cli.no_stem {
        EnglishNormalizer::without_stemming()
    } else {
        EnglishNormalizer::new()
    };
    let learner: Learner = Learner::build_with(&records, config, normalizer)?;
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "training finished");

    let summary = learner.summary();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }

    if cli.vocab {
        println!();
        println!("Selected vocabulary:");
        println!("{}", VocabularyListing::new(learner.selected_vocabulary()));
    }

    if let Some(test) = &cli.test {
        let test_records = load_records(test, cli.skip_header)?;
        let evaluation = learner.evaluate(&test_records);
        println!();
        println!("{evaluation}");
    }

    for query in &cli.queries {
        println!("{}\t{}", learner.classify(query), query);
    }

    Ok(())
}
