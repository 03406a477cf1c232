use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;
use log::warn;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::document;
use crate::error::Result;

/// The corpus vocabulary.
/// Maps each surviving lemma to its document frequency; the map position of
/// a lemma is its feature index, so indices are a dense zero-based range.
/// Built once per run and read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vocabulary {
    #[serde(with = "indexmap::map::serde_seq")]
    entries: IndexMap<String, u32>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Build the table from aggregated corpus counts.
    /// Lemmas with a total count of exactly 1 are dropped as noise.
    /// Feature indices are assigned in lexicographic lemma order, which keeps
    /// the table identical across runs over the same corpus.
    pub fn from_counts(counts: HashMap<String, u64>) -> Self {
        let mut lemmas: Vec<(String, u64)> =
            counts.into_iter().filter(|&(_, df)| df != 1).collect();
        lemmas.sort_by(|a, b| a.0.cmp(&b.0));
        let entries = lemmas
            .into_iter()
            .map(|(lemma, df)| (lemma, df as u32))
            .collect();
        Self { entries }
    }

    /// Feature index and document frequency for a lemma, if it is in
    /// the vocabulary.
    #[inline]
    pub fn feature(&self, lemma: &str) -> Option<(usize, u32)> {
        self.entries
            .get_full(lemma)
            .map(|(index, _, &df)| (index, df))
    }

    #[inline]
    pub fn contains(&self, lemma: &str) -> bool {
        self.entries.contains_key(lemma)
    }

    /// Vocabulary size, which is also the dimensionality of every vector.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in feature-index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(lemma, &df)| (lemma.as_str(), df))
    }
}

/// Table file I/O. One `lemma<TAB>df` record per line, line position
/// defining the feature index.
impl Vocabulary {
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut entries: IndexMap<String, u32> = IndexMap::new();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let Some((lemma, df)) = line.rsplit_once('\t') else {
                warn!("vocabulary line without tab, skipped: {:?}", line);
                continue;
            };
            let Ok(df) = df.trim().parse::<u32>() else {
                warn!("vocabulary line with unparsable df, skipped: {:?}", line);
                continue;
            };
            if entries.contains_key(lemma) {
                warn!("vocabulary has non-unique lemma, keeping first: {:?}", lemma);
                continue;
            }
            entries.insert(lemma.to_string(), df);
        }
        Ok(Self { entries })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for (lemma, df) in self.iter() {
            writeln!(writer, "{}\t{}", lemma, df)?;
        }
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Corpus-wide vocabulary pass.
/// Each listed `<lemma,count>` tuple contributes one observation, independent
/// of its term frequency. Partial counts are folded per worker and merged by
/// sum, so the aggregation order does not matter.
pub fn build_vocabulary(lines: &[String]) -> Vocabulary {
    let counts = lines
        .par_iter()
        .fold(HashMap::new, |mut acc: HashMap<String, u64>, line| {
            match document::parse_record(line) {
                Ok(doc) => {
                    for (lemma, _count) in doc.terms {
                        *acc.entry(lemma).or_insert(0) += 1;
                    }
                }
                Err(e) => warn!("skipping record in vocabulary pass: {}", e),
            }
            acc
        })
        .reduce(HashMap::new, |mut left, right| {
            for (lemma, count) in right {
                *left.entry(lemma).or_insert(0) += count;
            }
            left
        });
    Vocabulary::from_counts(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Cursor;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn singleton_lemmas_are_excluded() {
        let corpus = lines(&[
            "A\t<alpha,3>,<beta,1>",
            "B\t<alpha,1>,<gamma,2>",
        ]);
        let vocab = build_vocabulary(&corpus);
        assert!(vocab.contains("alpha"));
        assert!(!vocab.contains("beta"));
        assert!(!vocab.contains("gamma"));
        assert_eq!(vocab.len(), 1);
    }

    #[test]
    fn indices_are_a_dense_bijection() {
        let corpus = lines(&[
            "A\t<c,1>,<a,1>,<b,1>",
            "B\t<c,1>,<a,1>,<b,1>",
            "C\t<d,1>,<a,1>",
        ]);
        let vocab = build_vocabulary(&corpus);
        let indices: HashSet<usize> = vocab
            .iter()
            .map(|(lemma, _)| vocab.feature(lemma).unwrap().0)
            .collect();
        assert_eq!(indices.len(), vocab.len());
        assert!(indices.iter().all(|&i| i < vocab.len()));
    }

    #[test]
    fn counts_once_per_listed_tuple_not_per_frequency() {
        // "alpha" appears with term frequency 5 in one document; that is
        // still a single observation for the vocabulary pass.
        let corpus = lines(&["A\t<alpha,5>", "B\t<alpha,1>"]);
        let vocab = build_vocabulary(&corpus);
        assert_eq!(vocab.feature("alpha"), Some((0, 2)));
    }

    #[test]
    fn malformed_records_do_not_fail_the_pass() {
        let corpus = lines(&[
            "A\t<alpha,2>",
            "garbage line with no delimiter",
            "B\t<alpha,1>",
        ]);
        let vocab = build_vocabulary(&corpus);
        assert_eq!(vocab.len(), 1);
    }

    #[test]
    fn table_roundtrips_through_text_format() {
        let corpus = lines(&["A\t<b,1>,<a,1>", "B\t<b,1>,<a,1>"]);
        let vocab = build_vocabulary(&corpus);
        let mut buf = Vec::new();
        vocab.write_to(&mut buf).unwrap();
        let reloaded = Vocabulary::from_reader(Cursor::new(buf)).unwrap();
        assert_eq!(reloaded.len(), vocab.len());
        assert_eq!(reloaded.feature("a"), vocab.feature("a"));
        assert_eq!(reloaded.feature("b"), vocab.feature("b"));
    }

    #[test]
    fn duplicate_table_entries_keep_the_first() {
        let table = "alpha\t4\nbeta\t2\nalpha\t9\n";
        let vocab = Vocabulary::from_reader(Cursor::new(table)).unwrap();
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.feature("alpha"), Some((0, 4)));
        assert_eq!(vocab.feature("beta"), Some((1, 2)));
    }

    #[test]
    fn index_follows_line_position() {
        let table = "zeta\t3\nalpha\t2\n";
        let vocab = Vocabulary::from_reader(Cursor::new(table)).unwrap();
        assert_eq!(vocab.feature("zeta"), Some((0, 3)));
        assert_eq!(vocab.feature("alpha"), Some((1, 2)));
    }
}
