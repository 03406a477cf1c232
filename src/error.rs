use thiserror::Error;

/// Crate-wide error type.
/// Recoverable cases (malformed records, out-of-vocabulary lemmas) are logged
/// and skipped by the passes; configuration and I/O errors abort the run.
#[derive(Debug, Error)]
pub enum Error {
    /// A document or vocabulary line failed to parse.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// A lemma was not found in the vocabulary while building a training vector.
    #[error("lemma {lemma:?} not in vocabulary (document {title:?})")]
    OutOfVocabulary { title: String, lemma: String },

    /// Invalid or missing run parameter. Raised before any data is processed.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Model training was asked to fit zero examples.
    #[error("no training examples")]
    EmptyTrainingSet,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(#[from] serde_cbor::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
