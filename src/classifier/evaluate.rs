use std::fmt::{self, Debug};

use serde::Serialize;

/// Accumulated score of every category for one document, in category rank order.
pub struct CategoryScores<'a> {
    /// (category, score)
    pub list: Vec<(&'a str, f64)>,
}

impl<'a> CategoryScores<'a> {
    pub fn new(list: Vec<(&'a str, f64)>) -> Self {
        CategoryScores { list }
    }

    /// Highest score; on ties the category listed first.
    pub fn best(&self) -> Option<(&'a str, f64)> {
        let mut best: Option<(&'a str, f64)> = None;
        for &(category, score) in &self.list {
            match best {
                Some((_, max)) if score <= max => {}
                // NaN never wins over a real score
                Some(_) if score.is_nan() => {}
                _ => best = Some((category, score)),
            }
        }
        best
    }

    /// Sort by descending score. Stable, so ties keep rank order.
    pub fn sort_by_score(&mut self) -> &mut Self {
        self.list.retain(|(_, s)| !s.is_nan());
        self.list.sort_by(|a, b| b.1.total_cmp(&a.1));
        self
    }
}

impl Debug for CategoryScores<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "CategoryScores [")?;
            for (category, score) in &self.list {
                writeln!(f, "    {:?}: {:.6}", category, score)?;
            }
            write!(f, "]")
        } else {
            f.debug_list().entries(&self.list).finish()
        }
    }
}

/// Classification of one labeled record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub expected: Vec<String>,
    pub predicted: String,
    /// the prediction is one of the expected labels
    pub correct: bool,
}

/// Result of classifying a labeled test set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Evaluation {
    pub outcomes: Vec<Outcome>,
    pub correct: usize,
}

impl Evaluation {
    pub fn from_outcomes(outcomes: Vec<Outcome>) -> Self {
        let correct = outcomes.iter().filter(|o| o.correct).count();
        Evaluation { outcomes, correct }
    }

    #[inline]
    pub fn evaluated(&self) -> usize {
        self.outcomes.len()
    }

    /// correct / evaluated, 0 for an empty test set
    pub fn accuracy(&self) -> f64 {
        if self.outcomes.is_empty() {
            0.0
        } else {
            self.correct as f64 / self.outcomes.len() as f64
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Evaluated: {}", self.evaluated())?;
        writeln!(f, "Correct:   {}", self.correct)?;
        write!(f, "Accuracy:  {:.4}", self.accuracy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_prefers_first_on_ties() {
        let scores = CategoryScores::new(vec![("a", -2.0), ("b", -1.0), ("c", -1.0)]);
        assert_eq!(scores.best(), Some(("b", -1.0)));
        let zeros = CategoryScores::new(vec![("a", 0.0), ("b", 0.0)]);
        assert_eq!(zeros.best(), Some(("a", 0.0)));
        assert_eq!(CategoryScores::new(vec![]).best(), None);
    }

    #[test]
    fn best_skips_nan() {
        let scores = CategoryScores::new(vec![("a", f64::NAN), ("b", -5.0)]);
        assert_eq!(scores.best(), Some(("b", -5.0)));
    }

    #[test]
    fn sort_keeps_rank_order_on_ties() {
        let mut scores = CategoryScores::new(vec![("a", -3.0), ("b", -1.0), ("c", -3.0)]);
        scores.sort_by_score();
        let order: Vec<&str> = scores.list.iter().map(|(c, _)| *c).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn accuracy() {
        let outcome = |correct| Outcome {
            expected: vec!["x".into()],
            predicted: "x".into(),
            correct,
        };
        let eval = Evaluation::from_outcomes(vec![
            outcome(true),
            outcome(false),
            outcome(true),
            outcome(true),
        ]);
        assert_eq!(eval.correct, 3);
        assert_eq!(eval.evaluated(), 4);
        assert_eq!(eval.accuracy(), 0.75);
        assert_eq!(Evaluation::default().accuracy(), 0.0);
    }
}
