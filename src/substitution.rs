
use tracing::{debug, warn};

use crate::alignment::ContainmentGroups;
use crate::dictionary::{DictionaryStore, WordMatch};
use crate::textgrid::Tier;
use crate::transcription::GlottalMarker;

/// A word whose dictionary entries all disagree with the number of phones
/// the aligner gave it. Its phones keep their aligner labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mismatch {
  pub word_index: usize,
  pub word: String,
  pub phone_count: usize,
  pub script_lengths: Vec<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubstitutionReport {
  pub substituted: usize,
  /// Words with no entry in the three-column dictionary.
  pub missing: Vec<String>,
  pub mismatches: Vec<Mismatch>,
}

const MATCH: WordMatch = WordMatch::CaseInsensitiveSameLength;

/// Rewrites the phone labels of every word found in the three-column
/// dictionary with that entry's graphemes, position by position.
///
/// A word written with its glottal marker also matches the key it was
/// generated under, so `'ARA` finds `qara`.
pub fn substitute(
  phones: &mut Tier,
  words: &Tier,
  groups: &ContainmentGroups,
  store: &DictionaryStore,
  marker: &GlottalMarker,
) -> SubstitutionReport {
  let mut report = SubstitutionReport::default();

  for (word_index, word) in words.intervals().iter().enumerate() {
    let text = word.text.trim();
    if text.is_empty() {
      continue;
    }

    let group = groups.phones_in(word_index);
    let candidates = marker.key_forms(text).iter()
      .map(|k| store.three_column.find(k, MATCH))
      .find(|found| !found.is_empty())
      .unwrap_or_default();
    if candidates.is_empty() {
      debug!(word = text, "no three-column entry");
      report.missing.push(text.to_owned());
      continue;
    }

    let fitting = candidates.iter().rev()
      .filter_map(|e| e.script_form.as_ref())
      .find(|script| script.len() == group.len());

    match fitting {
      Some(script) => {
        for (&phone, grapheme) in group.iter().zip(script) {
          phones.set_text(phone, grapheme);
        }
        report.substituted += 1;
      },
      None => {
        let script_lengths: Vec<usize> = candidates.iter()
          .map(|e| e.script_form.as_ref().map(|s| s.len()).unwrap_or(0))
          .collect();
        warn!(word = text, word_index, phones = group.len(), ?script_lengths,
          "phone count does not match the dictionary; keeping aligner labels");
        report.mismatches.push(Mismatch {
          word_index,
          word: text.to_owned(),
          phone_count: group.len(),
          script_lengths,
        });
      }
    }
  }

  report
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::alignment::align;
  use crate::conventions::Conventions;
  use crate::textgrid::Interval;

  fn store(three_column: &str) -> DictionaryStore {
    let mut s = DictionaryStore::new(Conventions::default().normalizer());
    s.load_three_column(three_column, "dict3.txt").unwrap();
    s
  }

  fn tiers(phones: &[(f64, f64, &str)], words: &[(f64, f64, &str)]) -> (Tier, Tier) {
    let t = |v: &[(f64, f64, &str)]| Tier::from_intervals(v.iter().map(|(s, e, x)| Interval::new(*s, *e, x)).collect());
    (t(phones), t(words))
  }

  #[test]
  fn test_positional_rewrite() {
    let (mut phones, words) = tiers(&[(0.0, 0.5, "T"), (0.5, 1.0, "EH")], &[(0.0, 1.0, "te")]);
    let groups = ContainmentGroups { groups: vec![vec![0, 1]] };
    let report = substitute(&mut phones, &words, &groups, &store("te\tT EH1\tt e\n"), &GlottalMarker::default());
    assert_eq!(phones.texts(), vec!["t", "e"]);
    assert_eq!(phones.intervals()[1].start, 0.5);
    assert_eq!(phones.intervals()[1].end, 1.0);
    assert_eq!(report.substituted, 1);
  }

  #[test]
  fn test_count_mismatch_leaves_phones() {
    let (mut phones, words) = tiers(&[(0.0, 0.3, "T"), (0.3, 0.6, "EH1"), (0.6, 1.0, "N")], &[(0.0, 1.0, "te")]);
    let groups = align(phones.intervals(), words.intervals());
    let report = substitute(&mut phones, &words, &groups, &store("te\tT EH1\tt e\n"), &GlottalMarker::default());
    assert_eq!(phones.texts(), vec!["T", "EH1", "N"]);
    assert_eq!(report.substituted, 0);
    assert_eq!(report.mismatches, vec![Mismatch {
      word_index: 0,
      word: "te".to_owned(),
      phone_count: 3,
      script_lengths: vec![2],
    }]);
  }

  #[test]
  fn test_case_insensitive_same_length_lookup() {
    let (mut phones, words) = tiers(
      &[(0.0, 0.2, "T"), (0.2, 0.4, "EH1"), (0.4, 0.6, "NG"), (0.6, 0.8, "EH1"), (0.8, 1.0, "AH1")],
      &[(0.0, 0.8, "TENGE"), (0.8, 1.0, "A")]);
    let groups = align(phones.intervals(), words.intervals());
    let report = substitute(&mut phones, &words, &groups, &store("a\tAH1\tā\ntenge\tT EH1 NG EH1\tt e ng e\n"), &GlottalMarker::default());
    assert_eq!(phones.texts(), vec!["t", "e", "ng", "e", "ā"]);
    assert_eq!(report.substituted, 2);
  }

  #[test]
  fn test_last_fitting_entry_wins() {
    let (mut phones, words) = tiers(&[(0.0, 0.5, "T"), (0.5, 1.0, "EH1")], &[(0.0, 1.0, "te")]);
    let groups = align(phones.intervals(), words.intervals());
    let dict = "te\tT EH1\tt e\nte\tT EH1\tt ē\nte\tT EH1 EH1\tt e e\n";
    substitute(&mut phones, &words, &groups, &store(dict), &GlottalMarker::default());
    assert_eq!(phones.texts(), vec!["t", "ē"]);
  }

  #[test]
  fn test_glottal_word_finds_generated_key() {
    let (mut phones, words) = tiers(
      &[(0.0, 0.25, "Q"), (0.25, 0.5, "AE1"), (0.5, 0.75, "R"), (0.75, 1.0, "AE1")],
      &[(0.0, 1.0, "'ARA")]);
    let groups = align(phones.intervals(), words.intervals());
    let report = substitute(&mut phones, &words, &groups, &store("qara\tQ AE1 R AE1\t' a r a\n"), &GlottalMarker::default());
    assert_eq!(phones.texts(), vec!["'", "a", "r", "a"]);
    assert_eq!(report.substituted, 1);
    assert!(report.missing.is_empty());
  }

  #[test]
  fn test_missing_and_silent_words() {
    let (mut phones, words) = tiers(&[(0.0, 0.5, "K"), (0.5, 1.0, "sp")], &[(0.0, 0.5, "ka"), (0.5, 1.0, "")]);
    let groups = align(phones.intervals(), words.intervals());
    let report = substitute(&mut phones, &words, &groups, &store("te\tT EH1\tt e\n"), &GlottalMarker::default());
    assert_eq!(phones.texts(), vec!["K", "sp"]);
    assert_eq!(report.missing, vec!["ka"]);
    assert!(report.mismatches.is_empty());
  }
}
