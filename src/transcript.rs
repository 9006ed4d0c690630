
use std::collections::BTreeSet;

use crate::conventions::LineNormalizer;
use crate::error::{Error, Result};

const TEXT_COLUMN: usize = 4;

/// A row of the aligner's input transcript:
/// `speaker<TAB>speaker<TAB>start<TAB>end<TAB>text`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscriptRow {
  pub line: usize,
  pub columns: Vec<String>,
}

impl TranscriptRow {
  pub fn text(&self) -> &str {
    &self.columns[TEXT_COLUMN]
  }
}

#[derive(Clone, Debug, Default)]
pub struct TranscriptTable {
  pub rows: Vec<TranscriptRow>,
}

impl TranscriptTable {
  pub fn parse(text: &str, source_name: &str) -> Result<TranscriptTable> {
    let mut rows = vec![];

    for (i, line) in text.split('\n').enumerate() {
      let line = line.trim_end_matches('\r');
      if line.trim().is_empty() {
        continue;
      }
      let columns: Vec<String> = line.split('\t').map(|c| c.to_owned()).collect();
      if columns.len() <= TEXT_COLUMN {
        return Err(Error::parse(source_name, i + 1,
          format!("expected 5 tab-separated columns, found {}", columns.len())));
      }
      rows.push(TranscriptRow { line: i + 1, columns });
    }

    Ok(TranscriptTable { rows })
  }

  /// Every distinct word of the text column, cleaned and lowercased.
  pub fn unique_words(&self, normalizer: &LineNormalizer) -> BTreeSet<String> {
    self.rows.iter()
      .flat_map(|row| {
        normalizer.normalize(row.text())
          .to_lowercase()
          .split_whitespace()
          .map(|w| w.to_owned())
          .collect::<Vec<_>>()
      })
      .collect()
  }
}
