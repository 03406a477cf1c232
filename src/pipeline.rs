use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{error, warn};
use rayon::prelude::*;

use crate::config::CorpusMode;
use crate::document;
use crate::error::Result;
use crate::vector::{DocumentVectors, TestExample, TrainingExample, VectorBuilder};

/// All vectors of one corpus pass, shaped by the run mode.
#[derive(Debug, Clone, PartialEq)]
pub enum CorpusVectors {
    Training(Vec<TrainingExample>),
    Test(Vec<TestExample>),
}

/// Read a whole corpus file into memory, one record per line.
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line?);
    }
    Ok(lines)
}

/// The vectorization pass. Runs strictly after the vocabulary build: every
/// feature index and IDF weight depends on the finished corpus-wide table,
/// so the barrier between the passes is plain call sequencing.
///
/// Per-document work is order-independent and runs in parallel; workers only
/// read the immutable vocabulary and catalog. Malformed records and dropped
/// documents are logged and skipped without failing the pass.
pub fn vectorize_corpus(lines: &[String], builder: &VectorBuilder) -> CorpusVectors {
    let produced: Vec<DocumentVectors> = lines
        .par_iter()
        .filter_map(|line| {
            let doc = match document::parse_record(line) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!("skipping record in vector pass: {}", e);
                    return None;
                }
            };
            match builder.build(&doc) {
                Ok(vectors) => vectors,
                Err(e) => {
                    // training-mode vocabulary mismatch, surfaced per document
                    error!("dropping document: {}", e);
                    None
                }
            }
        })
        .collect();

    match builder.mode() {
        CorpusMode::Train => {
            let mut examples = Vec::new();
            for vectors in produced {
                if let DocumentVectors::Training(mut batch) = vectors {
                    examples.append(&mut batch);
                }
            }
            CorpusVectors::Training(examples)
        }
        CorpusMode::Test => {
            let mut examples = Vec::new();
            for vectors in produced {
                if let DocumentVectors::Test(example) = vectors {
                    examples.push(example);
                }
            }
            CorpusVectors::Test(examples)
        }
    }
}
