use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::warn;

use crate::error::Result;

/// Name to profession-list mapping, loaded once from the reference file and
/// immutable afterwards. Documents whose title is not listed here carry no
/// ground truth and are excluded from both training and test sets.
#[derive(Debug, Clone, Default)]
pub struct ProfessionCatalog {
    map: HashMap<String, Vec<String>>,
}

impl ProfessionCatalog {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Parse `name : prof1, prof2, ...` records.
    /// The split happens at the last colon, so names containing colons are
    /// handled. Lines without a colon are logged and skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut map = HashMap::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let Some((name, professions)) = line.rsplit_once(':') else {
                warn!("catalog line without colon, skipped: {:?}", line);
                continue;
            };
            let professions: Vec<String> = professions
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
            if professions.is_empty() {
                warn!("catalog line without professions, skipped: {:?}", line);
                continue;
            }
            map.insert(name.trim().to_string(), professions);
        }
        Ok(Self { map })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Professions associated with a document title.
    #[inline]
    pub fn lookup(&self, title: &str) -> Option<&[String]> {
        self.map.get(title).map(|v| v.as_slice())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
