
use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::tokenizer::MatchStrategy;

/// Language-specific constants shared by both pipelines.
///
/// Every field has a default, so a conventions file only needs to name what
/// differs, e.g. `{ "output_folds": [["ā", "ax"]] }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conventions {
  /// Leading character that marks a glottal stop in the source text.
  pub glottal_marker: char,
  /// Letter that stands in for `glottal_marker` in dictionary keys.
  pub glottal_substitute: char,
  pub stripped_punctuation: Vec<char>,
  /// Apostrophe look-alikes rewritten to ASCII `'` on every loaded line.
  pub apostrophe_variants: Vec<char>,
  /// `[from, to]` rewrites applied in order to the serialized dictionaries.
  pub output_folds: Vec<(String, String)>,
  pub strategy: MatchStrategy,
}

impl Default for Conventions {
  fn default() -> Self {
    Conventions {
      glottal_marker: '\'',
      glottal_substitute: 'q',
      stripped_punctuation: vec![',', '.', '?'],
      apostrophe_variants: vec!['\u{A78C}'],
      output_folds: vec![],
      strategy: MatchStrategy::default(),
    }
  }
}

impl Conventions {
  pub fn load(path: &Path) -> Result<Conventions> {
    let text = fs::read_to_string(path).map_err(|e| Error::io("reading", path, e))?;
    serde_json::from_str(&text).map_err(|source| Error::Config { path: path.to_owned(), source })
  }

  pub fn normalizer(&self) -> LineNormalizer {
    LineNormalizer {
      stripped: self.stripped_punctuation.clone(),
      apostrophes: self.apostrophe_variants.clone(),
    }
  }

  pub fn fold_output(&self, text: &str) -> String {
    let mut res = text.to_owned();
    for (from, to) in &self.output_folds {
      if !from.is_empty() {
        res = res.replace(from.as_str(), to);
      }
    }
    res
  }
}

/// Cleans a raw line before it is stored or compared: drops line-terminator
/// characters and stripped punctuation, and folds apostrophe variants to `'`.
#[derive(Clone, Debug)]
pub struct LineNormalizer {
  stripped: Vec<char>,
  apostrophes: Vec<char>,
}

impl LineNormalizer {
  pub fn normalize(&self, line: &str) -> String {
    line.chars()
      .filter(|c| *c != '\r' && *c != '\n' && !self.stripped.contains(c))
      .map(|c| if self.apostrophes.contains(&c) { '\'' } else { c })
      .collect()
  }
}
