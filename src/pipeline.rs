
//! The two batch runs, from input texts to output texts. Nothing here touches
//! the filesystem, so a failed run has nothing to clean up.

use std::collections::BTreeSet;

use itertools::Itertools;
use tracing::info;

use crate::alignment::align;
use crate::conventions::Conventions;
use crate::dictionary::{crlf_lines, DictionaryStore, WordMatch};
use crate::error::Result;
use crate::glyphs::GlyphInventory;
use crate::substitution::{substitute, SubstitutionReport};
use crate::textgrid::TextGrid;
use crate::transcript::TranscriptTable;
use crate::transcription::{GlottalMarker, TranscriptionGenerator, UnmappedWord};

/// An input file's contents and the name used in error messages.
#[derive(Clone, Copy, Debug)]
pub struct NamedText<'a> {
  pub name: &'a str,
  pub text: &'a str,
}

impl<'a> NamedText<'a> {
  pub fn new(name: &'a str, text: &'a str) -> NamedText<'a> {
    NamedText { name, text }
  }
}

#[derive(Clone, Debug)]
pub struct DictionaryGeneration {
  pub two_column: String,
  pub three_column: String,
  pub unmapped_report: String,
  pub new_words: Vec<String>,
  pub unmapped: Vec<UnmappedWord>,
}

/// Finds the transcript words missing from the two-column dictionary and
/// adds a generated entry for each one to both dictionaries.
pub fn generate_dictionaries(
  transcript: NamedText,
  glyphs: NamedText,
  two_column: NamedText,
  three_column: NamedText,
  conventions: &Conventions,
) -> Result<DictionaryGeneration> {
  let normalizer = conventions.normalizer();

  let words = TranscriptTable::parse(transcript.text, transcript.name)?.unique_words(&normalizer);
  let inventory = GlyphInventory::parse(glyphs.text, glyphs.name)?;

  let mut store = DictionaryStore::new(normalizer);
  store.load_two_column(two_column.text, two_column.name)?;
  store.load_three_column(three_column.text, three_column.name)?;

  let marker = GlottalMarker::from_conventions(conventions);
  let missing: BTreeSet<&str> = words.iter()
    .map(|w| w.as_str())
    .filter(|w| {
      !marker.key_forms(w).iter().any(|k| store.two_column.contains(k, WordMatch::CaseInsensitive))
    })
    .collect();

  info!(words = words.len(), missing = missing.len(), glyphs = inventory.len(), "transcript scanned");

  let generated = TranscriptionGenerator::from_conventions(conventions)
    .generate_all(missing.iter().copied(), &inventory);
  store.merge(&generated.entries);

  let unmapped_rows: Vec<String> = generated.unmapped.iter().map(|u| u.report_row()).collect();

  Ok(DictionaryGeneration {
    two_column: conventions.fold_output(&store.serialize_two_column()),
    three_column: conventions.fold_output(&store.serialize_three_column()),
    unmapped_report: crlf_lines(&unmapped_rows),
    new_words: generated.entries.iter().map(|e| e.word.clone()).collect(),
    unmapped: generated.unmapped,
  })
}

#[derive(Clone, Debug)]
pub struct ScriptRestoration {
  pub textgrid: String,
  pub report: SubstitutionReport,
}

/// Replaces the aligner's phone labels with the script graphemes recorded in
/// the three-column dictionary.
pub fn restore_script(textgrid: NamedText, three_column: NamedText, conventions: &Conventions) -> Result<ScriptRestoration> {
  let mut grid = TextGrid::parse(textgrid.text, textgrid.name)?;

  let mut store = DictionaryStore::new(conventions.normalizer());
  store.load_three_column(three_column.text, three_column.name)?;

  let marker = GlottalMarker::from_conventions(conventions);
  let groups = align(grid.phones.intervals(), grid.words.intervals());
  let report = substitute(&mut grid.phones, &grid.words, &groups, &store, &marker);

  info!(
    words = grid.words.len(),
    substituted = report.substituted,
    missing = report.missing.len(),
    mismatched = report.mismatches.len(),
    "script restored"
  );
  if !report.missing.is_empty() {
    info!(words = %report.missing.iter().unique().join(" "), "words not in the three-column dictionary");
  }

  Ok(ScriptRestoration { textgrid: grid.render(), report })
}
