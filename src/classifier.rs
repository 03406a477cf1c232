use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::vector::{SparseVector, TrainingExample};

/// Boundary to the trained model. Slot `i` of the score vector corresponds
/// to the `i`-th label of the caller-maintained sorted label list, fixed once
/// from the distinct training labels for the lifetime of a model.
pub trait Classifier {
    /// Stable size of the label space.
    fn num_categories(&self) -> usize;

    /// Per-class relative likelihood scores for one vector,
    /// length `num_categories()`. Scores are not normalized probabilities;
    /// only their ordering matters.
    fn classify(&self, vector: &SparseVector) -> Vec<f64>;
}

/// Distinct labels of a training set in lexicographic order. This is the
/// canonical label list the score-vector slots are matched against.
pub fn collect_labels(examples: &[TrainingExample]) -> Vec<String> {
    let set: BTreeSet<&str> = examples.iter().map(|e| e.label.as_str()).collect();
    set.into_iter().map(|s| s.to_string()).collect()
}

/// Laplace smoothing constant.
const ALPHA: f64 = 1.0;

/// Complementary Naive Bayes model over TF-IDF vectors.
/// Each class is scored against the mass of all *other* classes, which copes
/// better with the skewed label distribution of the profession data than the
/// plain multinomial form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayesModel {
    labels: Vec<String>,
    num_features: usize,
    /// Per label, per feature: negated log of the complement likelihood.
    weights: Vec<Vec<f64>>,
}

impl BayesModel {
    /// Fit the model. Labels are collected from the examples and sorted
    /// lexicographically; that order defines the score-vector slots.
    pub fn train(examples: &[TrainingExample], num_features: usize) -> Result<Self> {
        if examples.is_empty() {
            return Err(Error::EmptyTrainingSet);
        }
        let labels = collect_labels(examples);
        let label_index: HashMap<&str, usize> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.as_str(), i))
            .collect();

        // per-class and corpus-wide feature mass, TF-IDF weighted
        let mut class_feature = vec![vec![0.0f64; num_features]; labels.len()];
        let mut class_mass = vec![0.0f64; labels.len()];
        let mut feature_total = vec![0.0f64; num_features];
        let mut total_mass = 0.0f64;

        for example in examples {
            let c = label_index[example.label.as_str()];
            for (f, w) in example.vector.iter() {
                class_feature[c][f] += w;
                class_mass[c] += w;
                feature_total[f] += w;
                total_mass += w;
            }
        }

        let smoothed_dim = ALPHA * num_features as f64;
        let weights = (0..labels.len())
            .map(|c| {
                let complement_mass = total_mass - class_mass[c] + smoothed_dim;
                (0..num_features)
                    .map(|f| {
                        let complement = feature_total[f] - class_feature[c][f] + ALPHA;
                        -(complement / complement_mass).ln()
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            labels,
            num_features,
            weights,
        })
    }

    /// Canonical sorted label list. `classify` slot `i` scores `labels()[i]`.
    #[inline]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Length of every vector this model accepts.
    #[inline]
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_cbor::to_writer(writer, self)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_cbor::from_reader(reader)?)
    }
}

impl Classifier for BayesModel {
    #[inline]
    fn num_categories(&self) -> usize {
        self.labels.len()
    }

    fn classify(&self, vector: &SparseVector) -> Vec<f64> {
        self.weights
            .iter()
            .map(|class_weights| {
                vector
                    .iter()
                    .map(|(f, w)| w * class_weights.get(f).copied().unwrap_or(0.0))
                    .sum()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(label: &str, entries: &[(usize, f64)]) -> TrainingExample {
        let mut vector = SparseVector::new(4);
        for &(i, w) in entries {
            vector.set(i, w);
        }
        TrainingExample {
            label: label.to_string(),
            vector,
        }
    }

    fn separable_set() -> Vec<TrainingExample> {
        vec![
            example("writer", &[(0, 3.0), (1, 1.0)]),
            example("writer", &[(0, 2.0)]),
            example("chemist", &[(2, 3.0), (3, 1.0)]),
            example("chemist", &[(3, 2.0)]),
        ]
    }

    #[test]
    fn labels_are_distinct_and_sorted() {
        let labels = collect_labels(&separable_set());
        assert_eq!(labels, vec!["chemist".to_string(), "writer".to_string()]);
    }

    #[test]
    fn scores_follow_the_sorted_label_order() {
        let model = BayesModel::train(&separable_set(), 4).unwrap();
        assert_eq!(model.num_categories(), 2);
        assert_eq!(model.labels(), &["chemist".to_string(), "writer".to_string()]);

        let mut writerish = SparseVector::new(4);
        writerish.set(0, 2.0);
        let scores = model.classify(&writerish);
        assert_eq!(scores.len(), 2);
        // slot 1 is "writer" and must outscore "chemist" on feature 0
        assert!(scores[1] > scores[0]);

        let mut chemistish = SparseVector::new(4);
        chemistish.set(3, 2.0);
        let scores = model.classify(&chemistish);
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn empty_training_set_is_an_error() {
        assert!(matches!(
            BayesModel::train(&[], 4),
            Err(Error::EmptyTrainingSet)
        ));
    }

    #[test]
    fn model_roundtrips_through_cbor() {
        let model = BayesModel::train(&separable_set(), 4).unwrap();
        let bytes = serde_cbor::to_vec(&model).unwrap();
        let reloaded: BayesModel = serde_cbor::from_slice(&bytes).unwrap();
        assert_eq!(reloaded.labels(), model.labels());
        assert_eq!(reloaded.num_features(), model.num_features());

        let mut vector = SparseVector::new(4);
        vector.set(0, 1.0);
        assert_eq!(reloaded.classify(&vector), model.classify(&vector));
    }
}
