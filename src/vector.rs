use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::catalog::ProfessionCatalog;
use crate::config::CorpusMode;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::vocabulary::Vocabulary;

/// Sparse TF-IDF feature vector. Only non-zero weights are stored, keyed by
/// feature index. The ordered map keeps iteration and serialization
/// deterministic regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    dim: usize,
    weights: BTreeMap<u32, f64>,
}

impl SparseVector {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            weights: BTreeMap::new(),
        }
    }

    /// Set a weight. Last write wins for a repeated index.
    #[inline]
    pub fn set(&mut self, index: usize, weight: f64) {
        debug_assert!(index < self.dim, "feature index out of range");
        self.weights.insert(index as u32, weight);
    }

    #[inline]
    pub fn get(&self, index: usize) -> f64 {
        self.weights.get(&(index as u32)).copied().unwrap_or(0.0)
    }

    /// Vector dimensionality (the vocabulary size).
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored (non-zero) entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.weights.len()
    }

    /// Iterate stored entries in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.weights.iter().map(|(&i, &w)| (i as usize, w))
    }
}

/// One labeled vector of the training set. A document with k professions
/// yields k examples sharing an identical vector.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub label: String,
    pub vector: SparseVector,
}

/// One record of the test set. The full label set stays with the vector so
/// the evaluator never needs a second catalog lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct TestExample {
    pub title: String,
    pub labels: Vec<String>,
    pub vector: SparseVector,
}

/// Vectors emitted for one document, shaped by the corpus mode.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentVectors {
    Training(Vec<TrainingExample>),
    Test(TestExample),
}

/// Store-key codec. Training keys wrap the profession in slashes so a label
/// is never confused with a substring of another; test keys couple the title
/// with the full profession list.
pub fn encode_training_key(profession: &str) -> String {
    format!("/{}/", profession)
}

pub fn parse_training_key(key: &str) -> Option<&str> {
    key.strip_prefix('/')?.strip_suffix('/')
}

const TEST_KEY_DELIMITER: &str = ":::";

pub fn encode_test_key(title: &str, professions: &[String]) -> String {
    format!("{}{}{}", title, TEST_KEY_DELIMITER, professions.join(","))
}

pub fn parse_test_key(key: &str) -> Option<(&str, Vec<String>)> {
    let (title, professions) = key.split_once(TEST_KEY_DELIMITER)?;
    let professions: Vec<String> = professions
        .split(',')
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .collect();
    if professions.is_empty() {
        return None;
    }
    Some((title, professions))
}

/// Per-document vector construction. Holds immutable references to the
/// vocabulary and catalog built once per run; safe to share across workers.
#[derive(Debug, Clone, Copy)]
pub struct VectorBuilder<'a> {
    vocabulary: &'a Vocabulary,
    catalog: &'a ProfessionCatalog,
    num_documents: u32,
    mode: CorpusMode,
}

impl<'a> VectorBuilder<'a> {
    pub fn new(
        vocabulary: &'a Vocabulary,
        catalog: &'a ProfessionCatalog,
        num_documents: u32,
        mode: CorpusMode,
    ) -> Self {
        Self {
            vocabulary,
            catalog,
            num_documents,
            mode,
        }
    }

    #[inline]
    pub fn mode(&self) -> CorpusMode {
        self.mode
    }

    /// Build the labeled vectors for one parsed document.
    ///
    /// Returns `Ok(None)` when the title has no catalog entry (no ground
    /// truth, excluded from both sets). An out-of-vocabulary lemma is skipped
    /// in test mode and aborts the document with an error in training mode,
    /// where the term list is expected to be vocabulary-consistent.
    pub fn build(&self, doc: &Document) -> Result<Option<DocumentVectors>> {
        let Some(professions) = self.catalog.lookup(&doc.title) else {
            info!("document {:?} has no associated professions, excluded", doc.title);
            return Ok(None);
        };

        let mut vector = SparseVector::new(self.vocabulary.len());
        for (lemma, term_freq) in &doc.terms {
            let Some((index, df)) = self.vocabulary.feature(lemma) else {
                match self.mode {
                    CorpusMode::Test => {
                        debug!("lemma {:?} not in vocabulary, skipped", lemma);
                        continue;
                    }
                    CorpusMode::Train => {
                        return Err(Error::OutOfVocabulary {
                            title: doc.title.clone(),
                            lemma: lemma.clone(),
                        });
                    }
                }
            };
            let idf = (self.num_documents as f64 / df as f64).log10();
            vector.set(index, *term_freq as f64 * idf);
        }

        Ok(Some(match self.mode {
            CorpusMode::Train => DocumentVectors::Training(
                professions
                    .iter()
                    .map(|profession| TrainingExample {
                        label: profession.clone(),
                        vector: vector.clone(),
                    })
                    .collect(),
            ),
            CorpusMode::Test => DocumentVectors::Test(TestExample {
                title: doc.title.clone(),
                labels: professions.to_vec(),
                vector,
            }),
        }))
    }
}
