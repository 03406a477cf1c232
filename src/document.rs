use crate::error::{Error, Result};

/// One parsed corpus record.
/// Holds the article title and the ordered lemma/term-frequency pairs,
/// exactly as they appeared on the input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub terms: Vec<(String, u32)>,
}

impl Document {
    /// Number of distinct term entries listed for this document.
    #[inline]
    pub fn term_num(&self) -> usize {
        self.terms.len()
    }
}

/// Parse one raw record line of the form
/// `title<TAB>...<lemma1,count1>,<lemma2,count2>,...`.
///
/// The title may itself contain tabs; everything before the last tab is the
/// title. A lemma may contain commas, so the last comma inside a bracket
/// group separates the lemma from its count.
pub fn parse_record(line: &str) -> Result<Document> {
    let (title_part, lemma_part) = line
        .rsplit_once('\t')
        .ok_or_else(|| Error::MalformedRecord(format!("no tab delimiter: {}", preview(line))))?;
    let title = title_part.trim().to_string();

    // everything before the first '<' is discarded
    let start = lemma_part
        .find('<')
        .ok_or_else(|| Error::MalformedRecord(format!("document {:?} has no terms", title)))?;

    let mut terms = Vec::new();
    for group in lemma_part[start + 1..].split(">,") {
        let cleaned: String = group.chars().filter(|&c| c != '<' && c != '>').collect();
        let (lemma, count) = cleaned.rsplit_once(',').ok_or_else(|| {
            Error::MalformedRecord(format!("term group without count in {:?}", title))
        })?;
        let count: u32 = count.trim().parse().map_err(|_| {
            Error::MalformedRecord(format!("unparsable count {:?} in {:?}", count, title))
        })?;
        terms.push((lemma.to_string(), count));
    }
    if terms.is_empty() {
        return Err(Error::MalformedRecord(format!(
            "document {:?} has an empty term section",
            title
        )));
    }
    Ok(Document { title, terms })
}

/// Shorten a raw line for error messages.
fn preview(line: &str) -> String {
    const MAX: usize = 60;
    if line.len() <= MAX {
        line.to_string()
    } else {
        let cut = line
            .char_indices()
            .take_while(|(i, _)| *i <= MAX)
            .last()
            .map_or(0, |(i, _)| i);
        format!("{}...", &line[..cut])
    }
}
