
use std::collections::HashMap;

use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphEntry {
  pub grapheme: String,
  pub symbol: String,
}

impl GlyphEntry {
  pub fn is_digraph(&self) -> bool {
    self.grapheme.chars().count() > 1
  }
}

/// The grapheme to phonetic-symbol table of one language.
///
/// Graphemes are compared by exact string equality. When the same grapheme is
/// loaded twice the later mapping wins.
#[derive(Clone, Debug, Default)]
pub struct GlyphInventory {
  entries: Vec<GlyphEntry>,
  by_grapheme: HashMap<String, usize>,
  // Distinct grapheme lengths in chars, longest first.
  lengths: Vec<usize>,
}

impl GlyphInventory {
  pub fn load<I, G, S>(rows: I) -> GlyphInventory
  where
    I: IntoIterator<Item = (G, S)>,
    G: Into<String>,
    S: Into<String>,
  {
    let mut inventory = GlyphInventory::default();
    for (grapheme, symbol) in rows {
      inventory.push(GlyphEntry { grapheme: grapheme.into(), symbol: symbol.into() });
    }
    inventory
  }

  /// Reads `grapheme<TAB>symbol` lines. Blank lines are skipped.
  pub fn parse(text: &str, source_name: &str) -> Result<GlyphInventory> {
    let mut inventory = GlyphInventory::default();

    for (i, line) in text.lines().enumerate() {
      let line = line.trim_end_matches('\r');
      if line.trim().is_empty() {
        continue;
      }
      let mut columns = line.split('\t');
      let grapheme = columns.next().unwrap_or("");
      let symbol = columns.next()
        .ok_or_else(|| Error::parse(source_name, i + 1, "expected grapheme<TAB>symbol"))?
        .trim();
      if grapheme.is_empty() {
        return Err(Error::parse(source_name, i + 1, "empty grapheme"));
      }
      if symbol.is_empty() {
        return Err(Error::parse(source_name, i + 1, format!("no symbol for grapheme '{}'", grapheme)));
      }
      inventory.push(GlyphEntry { grapheme: grapheme.to_owned(), symbol: symbol.to_owned() });
    }

    Ok(inventory)
  }

  fn push(&mut self, entry: GlyphEntry) {
    let n = entry.grapheme.chars().count();
    if n > 0 && !self.lengths.contains(&n) {
      self.lengths.push(n);
      self.lengths.sort_by(|a, b| b.cmp(a));
    }
    self.by_grapheme.insert(entry.grapheme.clone(), self.entries.len());
    self.entries.push(entry);
  }

  pub fn lookup(&self, grapheme: &str) -> Option<&str> {
    self.by_grapheme.get(grapheme).map(|&i| self.entries[i].symbol.as_str())
  }

  pub fn contains(&self, grapheme: &str) -> bool {
    self.by_grapheme.contains_key(grapheme)
  }

  pub fn digraphs(&self) -> Vec<&GlyphEntry> {
    self.entries.iter().filter(|e| e.is_digraph()).collect()
  }

  pub fn entries(&self) -> &[GlyphEntry] {
    &self.entries
  }

  /// Candidate match lengths for the tokenizer, longest first.
  pub fn lengths(&self) -> &[usize] {
    &self.lengths
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
