/// This crate turns a corpus of lemmatized Wikipedia biography articles into
/// sparse TF-IDF feature vectors and scores a profession classifier's top-3
/// predictions against multi-label ground truth.
///
/// The work happens in two strictly sequenced passes over the corpus plus an
/// evaluation phase:
/// 1. Vocabulary pass: aggregate per-lemma counts corpus-wide, drop
///    singletons, assign stable feature indices.
/// 2. Vector pass: per document, combine the term list with the vocabulary
///    and the profession catalog into labeled sparse TF-IDF vectors.
/// 3. Evaluation: rank per-class scores, take the top 3, credit a prediction
///    if any ranked label matches any true label.
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod document;
pub mod error;
pub mod evaluate;
pub mod pipeline;
pub mod store;
pub mod vector;
pub mod vocabulary;

/// One parsed corpus record: title plus ordered (lemma, term frequency)
/// pairs. Constructed per input line and discarded after vectorization.
pub use document::Document;

/// The corpus vocabulary: lemma to document frequency, with the map position
/// doubling as the feature index. Built once per run, read-only afterwards.
pub use vocabulary::Vocabulary;

/// Name to profession-list mapping loaded from the reference file.
pub use catalog::ProfessionCatalog;

/// Sparse TF-IDF vector keyed by feature index; only non-zero weights are
/// stored.
pub use vector::SparseVector;

/// Per-document vector construction against an immutable vocabulary and
/// catalog. Training mode duplicates the vector once per profession; test
/// mode emits one record carrying the full label set.
pub use vector::{TestExample, TrainingExample, VectorBuilder};

/// Boundary to the trained model: stable label-space size plus per-class
/// scoring of one vector.
pub use classifier::Classifier;

/// Complementary Naive Bayes implementation of the classifier boundary.
pub use classifier::BayesModel;

/// Top-3 scoring of test vectors with the at-least-one-match rule and a
/// human-readable prediction report.
pub use evaluate::{EvalSummary, Evaluator, PredictionResult};

/// Validated run parameters and the train/test corpus mode switch.
pub use config::{CorpusMode, RunConfig};

/// Crate-wide error type and result alias.
pub use error::{Error, Result};
