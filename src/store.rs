use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::vector::{
    encode_test_key, encode_training_key, parse_test_key, parse_training_key, SparseVector,
    TestExample, TrainingExample,
};

/// One keyed record of a vector store file. The key carries the label
/// information: `/Profession/` for training vectors,
/// `title:::prof1,prof2,...` for test vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub key: String,
    pub vector: SparseVector,
}

fn write_records<P: AsRef<Path>>(path: P, records: &[VectorRecord]) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_cbor::to_writer(writer, &records)?;
    Ok(())
}

fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<VectorRecord>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_cbor::from_reader(reader)?)
}

pub fn write_training<P: AsRef<Path>>(path: P, examples: &[TrainingExample]) -> Result<()> {
    let records: Vec<VectorRecord> = examples
        .iter()
        .map(|e| VectorRecord {
            key: encode_training_key(&e.label),
            vector: e.vector.clone(),
        })
        .collect();
    write_records(path, &records)
}

/// Read a training store back. Records whose key does not parse are logged
/// and skipped, like any other malformed record.
pub fn read_training<P: AsRef<Path>>(path: P) -> Result<Vec<TrainingExample>> {
    let mut examples = Vec::new();
    for record in read_records(path)? {
        let Some(label) = parse_training_key(&record.key) else {
            warn!("training record with malformed key, skipped: {:?}", record.key);
            continue;
        };
        examples.push(TrainingExample {
            label: label.to_string(),
            vector: record.vector,
        });
    }
    Ok(examples)
}

pub fn write_test<P: AsRef<Path>>(path: P, examples: &[TestExample]) -> Result<()> {
    let records: Vec<VectorRecord> = examples
        .iter()
        .map(|e| VectorRecord {
            key: encode_test_key(&e.title, &e.labels),
            vector: e.vector.clone(),
        })
        .collect();
    write_records(path, &records)
}

pub fn read_test<P: AsRef<Path>>(path: P) -> Result<Vec<TestExample>> {
    let mut examples = Vec::new();
    for record in read_records(path)? {
        let Some((title, labels)) = parse_test_key(&record.key) else {
            warn!("test record with malformed key, skipped: {:?}", record.key);
            continue;
        };
        examples.push(TestExample {
            title: title.to_string(),
            labels,
            vector: record.vector,
        });
    }
    Ok(examples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("wikiprof-store-{}-{}", std::process::id(), name))
    }

    fn vector(entries: &[(usize, f64)]) -> SparseVector {
        let mut v = SparseVector::new(8);
        for &(i, w) in entries {
            v.set(i, w);
        }
        v
    }

    #[test]
    fn training_store_roundtrip() {
        let examples = vec![
            TrainingExample {
                label: "writer".to_string(),
                vector: vector(&[(0, 1.5), (3, 0.25)]),
            },
            TrainingExample {
                label: "chemist".to_string(),
                vector: vector(&[(2, 4.0)]),
            },
        ];
        let path = temp_path("train");
        write_training(&path, &examples).unwrap();
        let reloaded = read_training(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(reloaded, examples);
    }

    #[test]
    fn test_store_roundtrip() {
        let examples = vec![TestExample {
            title: "Ada Lovelace".to_string(),
            labels: vec!["mathematician".to_string(), "writer".to_string()],
            vector: vector(&[(1, 2.0)]),
        }];
        let path = temp_path("test");
        write_test(&path, &examples).unwrap();
        let reloaded = read_test(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(reloaded, examples);
    }
}
