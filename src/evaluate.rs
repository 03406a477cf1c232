use std::io::Write;

use log::info;
use rayon::prelude::*;

use crate::classifier::Classifier;
use crate::error::{Error, Result};
use crate::vector::TestExample;

/// Number of top-ranked labels credited as a prediction.
pub const TOP_K: usize = 3;

/// Progress signal cadence, in processed examples.
pub const PROGRESS_INTERVAL: usize = 2000;

/// Outcome for one test document. Correct iff the top-k predictions
/// intersect the true label set.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub title: String,
    pub predicted: Vec<String>,
    pub correct: bool,
}

/// Tally over a whole evaluation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalSummary {
    pub correct: usize,
    pub total: usize,
}

impl EvalSummary {
    /// Accuracy as a percentage.
    #[inline]
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64 * 100.0
    }
}

/// Scores test vectors through the classifier boundary and applies the
/// top-3 at-least-one-match rule against the true label sets.
pub struct Evaluator<'a, C: Classifier> {
    classifier: &'a C,
    labels: &'a [String],
    expected_total: usize,
}

impl<'a, C: Classifier> Evaluator<'a, C> {
    /// The label list must line up with the classifier's score slots.
    pub fn new(classifier: &'a C, labels: &'a [String], expected_total: usize) -> Result<Self> {
        if labels.len() != classifier.num_categories() {
            return Err(Error::Configuration(format!(
                "label list has {} entries but the classifier scores {} categories",
                labels.len(),
                classifier.num_categories()
            )));
        }
        Ok(Self {
            classifier,
            labels,
            expected_total,
        })
    }

    /// Classify one example and take the top-k ranked labels.
    /// Exact score ties keep the original label order (stable sort).
    pub fn predict_one(&self, example: &TestExample) -> PredictionResult {
        let scores = self.classifier.classify(&example.vector);
        let mut ranked: Vec<(usize, f64)> = scores.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let predicted: Vec<String> = ranked
            .iter()
            .take(TOP_K)
            .map(|&(i, _)| self.labels[i].clone())
            .collect();
        let correct = predicted.iter().any(|p| example.labels.contains(p));
        PredictionResult {
            title: example.title.clone(),
            predicted,
            correct,
        }
    }

    /// Score every test example, write one `title : p1, p2, p3` line per
    /// document to the report, and return the overall tally.
    ///
    /// Classification is a pure function per vector and runs in parallel;
    /// the tally and the report stay a single ordered pass so the running
    /// accuracy and the report line order are deterministic.
    pub fn evaluate<W: Write>(&self, examples: &[TestExample], mut report: W) -> Result<EvalSummary>
    where
        C: Sync,
    {
        let results: Vec<PredictionResult> = examples
            .par_iter()
            .map(|example| self.predict_one(example))
            .collect();

        let mut summary = EvalSummary::default();
        for result in &results {
            summary.total += 1;
            if result.correct {
                summary.correct += 1;
            }
            if summary.total % PROGRESS_INTERVAL == 0 {
                let pct = summary.total as f64 / self.expected_total.max(1) as f64 * 100.0;
                info!(
                    "predicted {:.0}% ({} correct so far, {:.2}% accuracy)",
                    pct,
                    summary.correct,
                    summary.accuracy()
                );
            }
            writeln!(report, "{} : {}", result.title, result.predicted.join(", "))?;
        }
        report.flush()?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::SparseVector;

    /// Fixed-score classifier for exercising the ranking rules.
    struct Stub {
        scores: Vec<f64>,
    }

    impl Classifier for Stub {
        fn num_categories(&self) -> usize {
            self.scores.len()
        }

        fn classify(&self, _vector: &SparseVector) -> Vec<f64> {
            self.scores.clone()
        }
    }

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn example(title: &str, true_labels: &[&str]) -> TestExample {
        TestExample {
            title: title.to_string(),
            labels: labels(true_labels),
            vector: SparseVector::new(1),
        }
    }

    #[test]
    fn credits_any_match_in_the_top_three() {
        let stub = Stub {
            scores: vec![4.0, 3.0, 2.0, 1.0],
        };
        let names = labels(&["A", "B", "C", "D"]);
        let evaluator = Evaluator::new(&stub, &names, 2).unwrap();

        let result = evaluator.predict_one(&example("hit", &["B"]));
        assert_eq!(result.predicted, labels(&["A", "B", "C"]));
        assert!(result.correct);

        let result = evaluator.predict_one(&example("miss", &["D"]));
        assert!(!result.correct);
    }

    #[test]
    fn exact_ties_keep_label_order() {
        let stub = Stub {
            scores: vec![1.0, 1.0, 1.0, 1.0],
        };
        let names = labels(&["A", "B", "C", "D"]);
        let evaluator = Evaluator::new(&stub, &names, 1).unwrap();
        let result = evaluator.predict_one(&example("t", &["A"]));
        assert_eq!(result.predicted, labels(&["A", "B", "C"]));
    }

    #[test]
    fn fewer_labels_than_top_k_is_handled() {
        let stub = Stub {
            scores: vec![2.0, 1.0],
        };
        let names = labels(&["A", "B"]);
        let evaluator = Evaluator::new(&stub, &names, 1).unwrap();
        let result = evaluator.predict_one(&example("t", &["B"]));
        assert_eq!(result.predicted, labels(&["A", "B"]));
        assert!(result.correct);
    }

    #[test]
    fn report_lines_and_tally() {
        let stub = Stub {
            scores: vec![3.0, 2.0, 1.0, 0.0],
        };
        let names = labels(&["A", "B", "C", "D"]);
        let evaluator = Evaluator::new(&stub, &names, 2).unwrap();
        let examples = vec![example("X", &["C"]), example("Y", &["D"])];

        let mut report = Vec::new();
        let summary = evaluator.evaluate(&examples, &mut report).unwrap();
        assert_eq!(summary, EvalSummary { correct: 1, total: 2 });
        assert!((summary.accuracy() - 50.0).abs() < 1e-12);

        let text = String::from_utf8(report).unwrap();
        assert_eq!(text, "X : A, B, C\nY : A, B, C\n");
    }

    #[test]
    fn empty_run_reports_zero_accuracy() {
        assert_eq!(EvalSummary::default().accuracy(), 0.0);
    }

    #[test]
    fn mismatched_label_list_is_rejected() {
        let stub = Stub {
            scores: vec![1.0, 2.0],
        };
        let names = labels(&["only one"]);
        assert!(matches!(
            Evaluator::new(&stub, &names, 1),
            Err(Error::Configuration(_))
        ));
    }
}
