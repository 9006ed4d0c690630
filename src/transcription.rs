
use itertools::Itertools;
use tracing::debug;

use crate::conventions::Conventions;
use crate::dictionary::DictionaryEntry;
use crate::glyphs::GlyphInventory;
use crate::tokenizer::{Tokenization, Tokenizer};

/// Rewrites a leading glottal marker (e.g. `'ara`) to a plain letter
/// (`qara`) for dictionary keys, and back again for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlottalMarker {
  pub marker: char,
  pub substitute: char,
}

impl Default for GlottalMarker {
  fn default() -> Self {
    GlottalMarker { marker: '\'', substitute: 'q' }
  }
}

impl GlottalMarker {
  pub fn from_conventions(c: &Conventions) -> GlottalMarker {
    GlottalMarker { marker: c.glottal_marker, substitute: c.glottal_substitute }
  }

  pub fn substitute(&self, word: &str) -> String {
    swap_first(word, self.marker, self.substitute)
  }

  pub fn restore(&self, word: &str) -> String {
    swap_first(word, self.substitute, self.marker)
  }

  /// The keys a source word may be stored under: as written first, then
  /// with the marker substituted.
  pub fn key_forms(&self, word: &str) -> Vec<String> {
    let key = self.substitute(word);
    if key == word {
      vec![key]
    }
    else {
      vec![word.to_owned(), key]
    }
  }
}

fn swap_first(word: &str, from: char, to: char) -> String {
  match word.strip_prefix(from) {
    Some(rest) => format!("{}{}", to, rest),
    None => word.to_owned()
  }
}

/// A word the inventory could not cover, with everything that could be cut.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnmappedWord {
  pub word: String,
  pub tokenization: Tokenization,
}

impl UnmappedWord {
  /// `word<TAB>partial segmentation<TAB>unknown pieces`
  pub fn report_row(&self) -> String {
    let residues = self.tokenization.residues().iter().join(" ");
    format!("{}\t{}\t{}", self.word, self.tokenization.render(), residues)
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TranscriptionResult {
  Mapped(DictionaryEntry),
  Unmapped(UnmappedWord),
}

impl TranscriptionResult {
  pub fn is_ok(&self) -> bool {
    matches!(self, TranscriptionResult::Mapped(_))
  }
}

#[derive(Clone, Debug, Default)]
pub struct GeneratedEntries {
  pub entries: Vec<DictionaryEntry>,
  pub unmapped: Vec<UnmappedWord>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TranscriptionGenerator {
  pub tokenizer: Tokenizer,
  pub marker: GlottalMarker,
}

impl TranscriptionGenerator {
  pub fn new(tokenizer: Tokenizer, marker: GlottalMarker) -> TranscriptionGenerator {
    TranscriptionGenerator { tokenizer, marker }
  }

  pub fn from_conventions(c: &Conventions) -> TranscriptionGenerator {
    TranscriptionGenerator::new(Tokenizer::new(c.strategy), GlottalMarker::from_conventions(c))
  }

  /// `word` is in source form (with its glottal marker, if any). The entry's
  /// key is the storage form; its script form keeps the marker as a segment.
  pub fn generate(&self, word: &str, inventory: &GlyphInventory) -> TranscriptionResult {
    let tokenization = self.tokenizer.tokenize(word, inventory);

    if !tokenization.is_ok() {
      debug!(word, residues = ?tokenization.residues(), "word has graphemes outside the inventory");
      return TranscriptionResult::Unmapped(UnmappedWord { word: word.to_owned(), tokenization });
    }

    let segments = tokenization.segments();
    let phonetic_form: Option<Vec<String>> = segments.iter()
      .map(|s| inventory.lookup(s).map(|p| p.to_owned()))
      .collect();

    match phonetic_form {
      Some(phonetic_form) => TranscriptionResult::Mapped(DictionaryEntry {
        word: self.marker.substitute(word),
        phonetic_form,
        script_form: Some(segments.iter().map(|s| s.to_string()).collect()),
      }),
      None => TranscriptionResult::Unmapped(UnmappedWord { word: word.to_owned(), tokenization })
    }
  }

  pub fn generate_all<'a, I>(&self, words: I, inventory: &GlyphInventory) -> GeneratedEntries
  where
    I: IntoIterator<Item = &'a str>,
  {
    let mut res = GeneratedEntries::default();
    for word in words {
      match self.generate(word, inventory) {
        TranscriptionResult::Mapped(entry) => res.entries.push(entry),
        TranscriptionResult::Unmapped(u) => res.unmapped.push(u)
      }
    }
    res
  }
}
