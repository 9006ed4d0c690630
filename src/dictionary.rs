
use std::collections::HashMap;

use itertools::Itertools;
use tracing::warn;

use crate::conventions::LineNormalizer;
use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DictionaryEntry {
  pub word: String,
  pub phonetic_form: Vec<String>,
  /// Graphemes of `word`, one per phonetic symbol.
  pub script_form: Option<Vec<String>>,
}

impl DictionaryEntry {
  pub fn two_column_row(&self) -> String {
    format!("{}\t{}", self.word, self.phonetic_form.join(" "))
  }

  pub fn three_column_row(&self) -> String {
    let script = self.script_form.as_ref().map(|s| s.join(" ")).unwrap_or_default();
    format!("{}\t{}\t{}", self.word, self.phonetic_form.join(" "), script)
  }

  pub fn is_aligned(&self) -> bool {
    match &self.script_form {
      Some(s) => s.len() == self.phonetic_form.len(),
      None => true
    }
  }
}

/// How a word is compared with dictionary keys.
///
/// Dictionary generation asks "is this word already known?" with
/// `CaseInsensitive`. Script restoration also requires equal length in
/// chars, so keys whose lowercase form happens to collide with a word of a
/// different length never match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordMatch {
  CaseInsensitive,
  CaseInsensitiveSameLength,
}

impl WordMatch {
  pub fn matches(&self, key: &str, word: &str) -> bool {
    let same_case = key.to_lowercase() == word.to_lowercase();
    match self {
      WordMatch::CaseInsensitive => same_case,
      WordMatch::CaseInsensitiveSameLength => same_case && key.chars().count() == word.chars().count()
    }
  }
}

/// Entries of one dictionary file in load order, indexed by lowercase key.
#[derive(Clone, Debug, Default)]
pub struct Dictionary {
  entries: Vec<DictionaryEntry>,
  // The normalized line each loaded entry came from, written back as is.
  lines: Vec<Option<String>>,
  by_lowercase: HashMap<String, Vec<usize>>,
}

impl Dictionary {
  pub fn push(&mut self, entry: DictionaryEntry) {
    self.push_line(entry, None);
  }

  fn push_line(&mut self, entry: DictionaryEntry, line: Option<String>) {
    self.by_lowercase.entry(entry.word.to_lowercase()).or_default().push(self.entries.len());
    self.entries.push(entry);
    self.lines.push(line);
  }

  /// One row per entry: the loaded line, or `render` for added entries.
  pub fn rows(&self, render: impl Fn(&DictionaryEntry) -> String) -> Vec<String> {
    self.entries.iter().zip(&self.lines)
      .map(|(e, line)| line.clone().unwrap_or_else(|| render(e)))
      .collect()
  }

  /// Matching entries in load order.
  pub fn find(&self, word: &str, policy: WordMatch) -> Vec<&DictionaryEntry> {
    match self.by_lowercase.get(&word.to_lowercase()) {
      Some(ids) => ids.iter()
        .map(|&i| &self.entries[i])
        .filter(|e| policy.matches(&e.word, word))
        .collect(),
      None => vec![]
    }
  }

  pub fn contains(&self, word: &str, policy: WordMatch) -> bool {
    !self.find(word, policy).is_empty()
  }

  pub fn entries(&self) -> &[DictionaryEntry] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// The two parallel dictionaries: `word<TAB>phones` and
/// `word<TAB>phones<TAB>graphemes`.
#[derive(Clone, Debug)]
pub struct DictionaryStore {
  pub two_column: Dictionary,
  pub three_column: Dictionary,
  normalizer: LineNormalizer,
}

impl DictionaryStore {
  pub fn new(normalizer: LineNormalizer) -> DictionaryStore {
    DictionaryStore {
      two_column: Dictionary::default(),
      three_column: Dictionary::default(),
      normalizer,
    }
  }

  pub fn load_two_column(&mut self, text: &str, source_name: &str) -> Result<()> {
    for (line_no, line) in self.lines(text) {
      let [word, phones] = take_columns::<2>(&line, source_name, line_no)?;
      let entry = DictionaryEntry {
        word,
        phonetic_form: split_tokens(&phones),
        script_form: None,
      };
      self.two_column.push_line(entry, Some(line));
    }
    Ok(())
  }

  pub fn load_three_column(&mut self, text: &str, source_name: &str) -> Result<()> {
    for (line_no, line) in self.lines(text) {
      let [word, phones, script] = take_columns::<3>(&line, source_name, line_no)?;
      let entry = DictionaryEntry {
        word,
        phonetic_form: split_tokens(&phones),
        script_form: Some(split_tokens(&script)),
      };
      if !entry.is_aligned() {
        warn!(source = source_name, line = line_no, word = %entry.word,
          "phonetic and script forms have different token counts");
      }
      self.three_column.push_line(entry, Some(line));
    }
    Ok(())
  }

  fn lines(&self, text: &str) -> Vec<(usize, String)> {
    text.split('\n').enumerate()
      .map(|(i, line)| (i + 1, self.normalizer.normalize(line)))
      .filter(|(_, line)| !line.trim().is_empty())
      .collect()
  }

  /// Adds generated entries to both dictionaries, keeping every existing one.
  /// Duplicates are kept too.
  pub fn merge(&mut self, new_entries: &[DictionaryEntry]) {
    for e in new_entries {
      self.two_column.push(DictionaryEntry { script_form: None, ..e.clone() });
      self.three_column.push(e.clone());
    }
  }

  pub fn two_column_rows(&self) -> Vec<String> {
    sorted_rows(self.two_column.rows(DictionaryEntry::two_column_row))
  }

  pub fn three_column_rows(&self) -> Vec<String> {
    sorted_rows(self.three_column.rows(DictionaryEntry::three_column_row))
  }

  pub fn serialize_two_column(&self) -> String {
    crlf_lines(&self.two_column_rows())
  }

  pub fn serialize_three_column(&self) -> String {
    crlf_lines(&self.three_column_rows())
  }
}

fn take_columns<const N: usize>(line: &str, source_name: &str, line_no: usize) -> Result<[String; N]> {
  let columns: Vec<&str> = line.split('\t').collect();
  if columns.len() < N {
    return Err(Error::parse(source_name, line_no,
      format!("expected {} tab-separated columns, found {}", N, columns.len())));
  }
  if columns[0].trim().is_empty() {
    return Err(Error::parse(source_name, line_no, "empty word"));
  }
  let mut res: [String; N] = std::array::from_fn(|_| String::new());
  for (slot, column) in res.iter_mut().zip(columns) {
    *slot = (*column).to_owned();
  }
  res[0] = res[0].trim().to_owned();
  Ok(res)
}

fn split_tokens(column: &str) -> Vec<String> {
  column.split_whitespace().map(|t| t.to_owned()).collect()
}

fn sorted_rows(rows: Vec<String>) -> Vec<String> {
  rows.into_iter().sorted().collect()
}

pub(crate) fn crlf_lines(rows: &[String]) -> String {
  rows.iter().map(|r| format!("{}\r\n", r)).join("")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::conventions::Conventions;

  fn store() -> DictionaryStore {
    DictionaryStore::new(Conventions::default().normalizer())
  }

  fn entry(word: &str, phones: &str, script: &str) -> DictionaryEntry {
    DictionaryEntry {
      word: word.to_owned(),
      phonetic_form: split_tokens(phones),
      script_form: Some(split_tokens(script)),
    }
  }

  #[test]
  fn test_load_two_column() {
    let mut s = store();
    s.load_two_column("i\tIY1\r\na\tAH1\r\n\r\n", "dict2.txt").unwrap();
    assert_eq!(s.two_column.len(), 2);
    assert_eq!(s.two_column.entries()[0].phonetic_form, vec!["IY1"]);
    assert_eq!(s.serialize_two_column(), "a\tAH1\r\ni\tIY1\r\n");
  }

  #[test]
  fn test_load_normalizes_lines() {
    let mut s = store();
    s.load_three_column("\u{A78C}ara.\tQ AA1 R AH0\t' a r a\r\n", "dict3.txt").unwrap();
    let e = &s.three_column.entries()[0];
    assert_eq!(e.word, "'ara");
    assert_eq!(e.script_form, Some(vec!["'".to_owned(), "a".into(), "r".into(), "a".into()]));
  }

  #[test]
  fn test_missing_column_is_a_parse_error() {
    let mut s = store();
    match s.load_three_column("a\tAH1\ta\nte\tT EH1\n", "dict3.txt") {
      Err(Error::Parse { line, source_name, .. }) => {
        assert_eq!(line, 2);
        assert_eq!(source_name, "dict3.txt");
      },
      other => panic!("unexpected {:?}", other)
    }
  }

  #[test]
  fn test_loaded_lines_are_written_back_as_read() {
    let mut s = store();
    s.load_three_column("te\tT  EH1\tt e\tnote\r\nka.\tK AH1\tk a\r\n", "dict3.txt").unwrap();
    s.merge(&[entry("a", "AE1", "a")]);
    assert_eq!(s.three_column.entries()[0].phonetic_form, vec!["T", "EH1"]);
    assert_eq!(s.serialize_three_column(), "a\tAE1\ta\r\nka\tK AH1\tk a\r\nte\tT  EH1\tt e\tnote\r\n");
    assert_eq!(s.serialize_two_column(), "a\tAE1\r\n");
  }

  #[test]
  fn test_misaligned_row_is_kept() {
    let mut s = store();
    s.load_three_column("te\tT EH1\tt e e\n", "dict3.txt").unwrap();
    assert!(!s.three_column.entries()[0].is_aligned());
  }

  #[test]
  fn test_word_match_policies() {
    assert!(WordMatch::CaseInsensitive.matches("Tenge", "TENGE"));
    assert!(WordMatch::CaseInsensitiveSameLength.matches("Tenge", "TENGE"));
    assert!(!WordMatch::CaseInsensitive.matches("tenge", "tengē"));
    // 'İ' lowercases to two chars, so only the length-blind policy matches.
    assert!(WordMatch::CaseInsensitive.matches("i\u{307}", "İ"));
    assert!(!WordMatch::CaseInsensitiveSameLength.matches("i\u{307}", "İ"));
  }

  #[test]
  fn test_find_in_load_order() {
    let mut d = Dictionary::default();
    d.push(entry("te", "T EH1", "t e"));
    d.push(entry("a", "AH1", "a"));
    d.push(entry("TE", "T IY1", "t e"));
    let found: Vec<&str> = d.find("Te", WordMatch::CaseInsensitive).iter().map(|e| e.phonetic_form[1].as_str()).collect();
    assert_eq!(found, vec!["EH1", "IY1"]);
    assert!(!d.contains("tea", WordMatch::CaseInsensitive));
  }

  #[test]
  fn test_merge_keeps_stores_in_step() {
    let mut s = store();
    s.load_two_column("i\tIY1\n", "dict2.txt").unwrap();
    s.load_three_column("i\tIY1\ti\n", "dict3.txt").unwrap();
    s.merge(&[entry("tenge", "T EH1 NG EH1", "t e ng e"), entry("a", "AE1", "a")]);
    assert_eq!(s.serialize_two_column(), "a\tAE1\r\ni\tIY1\r\ntenge\tT EH1 NG EH1\r\n");
    assert_eq!(s.serialize_three_column(), "a\tAE1\ta\r\ni\tIY1\ti\r\ntenge\tT EH1 NG EH1\tt e ng e\r\n");
  }

  #[test]
  fn test_merge_twice_preserves_duplicates() {
    let new = [entry("a", "AE1", "a")];
    let mut once = store();
    once.merge(&new);
    let mut twice = store();
    twice.merge(&new);
    twice.merge(&new);
    assert_eq!(once.two_column_rows(), vec!["a\tAE1"]);
    assert_eq!(twice.two_column_rows(), vec!["a\tAE1", "a\tAE1"]);
  }
}
