use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Which corpus a run is vectorizing. Training and test vectors are built one
/// run at a time; they are keyed differently and out-of-vocabulary lemmas are
/// handled differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusMode {
    Train,
    Test,
}

impl FromStr for CorpusMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "train" => Ok(CorpusMode::Train),
            "test" => Ok(CorpusMode::Test),
            other => Err(Error::Configuration(format!(
                "mode must be 'train' or 'test', got {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for CorpusMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusMode::Train => write!(f, "train"),
            CorpusMode::Test => write!(f, "test"),
        }
    }
}

/// Validated run parameters. Built from CLI arguments before any data is
/// touched; every error here is fatal.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: CorpusMode,
    pub corpus_path: PathBuf,
    pub vocabulary_path: PathBuf,
    pub catalog_path: PathBuf,
    /// Expected document count of the corpus, used as N in the IDF formula.
    pub num_documents: u32,
    /// Run the vocabulary pass and write the table before vectorizing.
    pub build_vocab: bool,
    /// Where this run's vectors are written.
    pub vectors_path: PathBuf,
    /// Training vector store read back when retraining in test mode.
    pub training_vectors_path: PathBuf,
    /// Retrain the model from the training vectors before evaluating.
    pub train: bool,
    pub model_path: PathBuf,
    pub report_path: PathBuf,
}

impl RunConfig {
    /// Parse CLI arguments (program name already stripped).
    pub fn from_args<I: Iterator<Item = String>>(mut args: I) -> Result<Self> {
        let mut mode = None;
        let mut corpus_path = None;
        let mut vocabulary_path = None;
        let mut catalog_path = PathBuf::from("professions.txt");
        let mut num_documents = None;
        let mut build_vocab = false;
        let mut vectors_path = None;
        let mut training_vectors_path = PathBuf::from("train-vectors.cbor");
        let mut train = false;
        let mut model_path = PathBuf::from("nbmodel.cbor");
        let mut report_path = PathBuf::from("prediction-results.txt");

        fn value<I: Iterator<Item = String>>(args: &mut I, flag: &str) -> Result<String> {
            args.next()
                .ok_or_else(|| Error::Configuration(format!("{} requires a value", flag)))
        }

        while let Some(a) = args.next() {
            match a.as_str() {
                "--mode" => mode = Some(value(&mut args, "--mode")?.parse::<CorpusMode>()?),
                "--corpus" => corpus_path = Some(PathBuf::from(value(&mut args, "--corpus")?)),
                "--vocabulary" => {
                    vocabulary_path = Some(PathBuf::from(value(&mut args, "--vocabulary")?))
                }
                "--professions" => {
                    catalog_path = PathBuf::from(value(&mut args, "--professions")?)
                }
                "--num-docs" => {
                    let raw = value(&mut args, "--num-docs")?;
                    let n = raw.parse::<u32>().map_err(|_| {
                        Error::Configuration(format!("--num-docs needs a positive integer, got {:?}", raw))
                    })?;
                    if n == 0 {
                        return Err(Error::Configuration(
                            "--num-docs needs a positive integer".to_string(),
                        ));
                    }
                    num_documents = Some(n);
                }
                "--build-vocab" => build_vocab = true,
                "--vectors" => vectors_path = Some(PathBuf::from(value(&mut args, "--vectors")?)),
                "--train-vectors" => {
                    training_vectors_path = PathBuf::from(value(&mut args, "--train-vectors")?)
                }
                "--train" => train = true,
                "--model" => model_path = PathBuf::from(value(&mut args, "--model")?),
                "--report" => report_path = PathBuf::from(value(&mut args, "--report")?),
                other => {
                    return Err(Error::Configuration(format!("unknown argument: {}", other)))
                }
            }
        }

        let mode = mode.ok_or_else(|| Error::Configuration("--mode is required".to_string()))?;
        let corpus_path =
            corpus_path.ok_or_else(|| Error::Configuration("--corpus is required".to_string()))?;
        let vocabulary_path = vocabulary_path
            .ok_or_else(|| Error::Configuration("--vocabulary is required".to_string()))?;
        let num_documents = num_documents
            .ok_or_else(|| Error::Configuration("--num-docs is required".to_string()))?;
        let vectors_path = vectors_path.unwrap_or_else(|| match mode {
            CorpusMode::Train => PathBuf::from("train-vectors.cbor"),
            CorpusMode::Test => PathBuf::from("test-vectors.cbor"),
        });

        Ok(Self {
            mode,
            corpus_path,
            vocabulary_path,
            catalog_path,
            num_documents,
            build_vocab,
            vectors_path,
            training_vectors_path,
            train,
            model_path,
            report_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args<'a>(raw: &'a [&'a str]) -> impl Iterator<Item = String> + 'a {
        raw.iter().map(|s| s.to_string())
    }

    #[test]
    fn parses_a_full_command() {
        let config = RunConfig::from_args(args(&[
            "--mode",
            "test",
            "--corpus",
            "test.tsv",
            "--vocabulary",
            "vocab.tsv",
            "--num-docs",
            "133417",
            "--train",
            "--report",
            "out.txt",
        ]))
        .unwrap();
        assert_eq!(config.mode, CorpusMode::Test);
        assert_eq!(config.num_documents, 133417);
        assert!(config.train);
        assert_eq!(config.vectors_path, PathBuf::from("test-vectors.cbor"));
        assert_eq!(config.report_path, PathBuf::from("out.txt"));
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = RunConfig::from_args(args(&[
            "--mode", "validate", "--corpus", "c", "--vocabulary", "v", "--num-docs", "5",
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn rejects_non_numeric_document_count() {
        let err = RunConfig::from_args(args(&[
            "--mode", "train", "--corpus", "c", "--vocabulary", "v", "--num-docs", "many",
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn rejects_zero_document_count() {
        let err = RunConfig::from_args(args(&[
            "--mode", "train", "--corpus", "c", "--vocabulary", "v", "--num-docs", "0",
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn rejects_missing_required_flags() {
        let err = RunConfig::from_args(args(&["--mode", "train"])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn default_vectors_path_follows_mode() {
        let config = RunConfig::from_args(args(&[
            "--mode", "train", "--corpus", "c", "--vocabulary", "v", "--num-docs", "5",
        ]))
        .unwrap();
        assert_eq!(config.vectors_path, PathBuf::from("train-vectors.cbor"));
    }
}
