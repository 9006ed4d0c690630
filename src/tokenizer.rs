
use clap::ValueEnum;
use itertools::Itertools;
use serde::{Serialize, Deserialize};

use crate::glyphs::GlyphInventory;

/// How a word is cut into graphemes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum MatchStrategy {
  /// One character per segment; digraphs are never formed.
  SimpleScan,
  /// At each position take the longest known grapheme.
  #[default]
  GreedyLongestMatch,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Piece {
  Grapheme(String),
  /// A character that starts no known grapheme.
  Residue(char),
}

impl Piece {
  pub fn text(&self) -> String {
    match self {
      Piece::Grapheme(g) => g.clone(),
      Piece::Residue(c) => c.to_string()
    }
  }
}

/// Every piece of a word, in order. Residues are kept so the caller can show
/// where a word went wrong, but they are not segments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tokenization {
  pub pieces: Vec<Piece>,
}

impl Tokenization {
  pub fn is_ok(&self) -> bool {
    self.pieces.iter().all(|p| matches!(p, Piece::Grapheme(_)))
  }

  pub fn segments(&self) -> Vec<&str> {
    self.pieces.iter().filter_map(|p| match p {
      Piece::Grapheme(g) => Some(g.as_str()),
      Piece::Residue(_) => None
    }).collect()
  }

  pub fn residues(&self) -> Vec<char> {
    self.pieces.iter().filter_map(|p| match p {
      Piece::Residue(c) => Some(*c),
      Piece::Grapheme(_) => None
    }).collect()
  }

  /// All pieces separated by spaces, residues included.
  pub fn render(&self) -> String {
    self.pieces.iter().map(|p| p.text()).join(" ")
  }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Tokenizer {
  pub strategy: MatchStrategy,
}

impl Tokenizer {
  pub fn new(strategy: MatchStrategy) -> Tokenizer {
    Tokenizer { strategy }
  }

  pub fn tokenize(&self, word: &str, inventory: &GlyphInventory) -> Tokenization {
    match self.strategy {
      MatchStrategy::SimpleScan => simple_scan(word, inventory),
      MatchStrategy::GreedyLongestMatch => greedy_longest_match(word, inventory)
    }
  }
}

fn simple_scan(word: &str, inventory: &GlyphInventory) -> Tokenization {
  let pieces = word.chars().map(|c| {
    let s = c.to_string();
    if inventory.contains(&s) { Piece::Grapheme(s) } else { Piece::Residue(c) }
  }).collect();

  Tokenization { pieces }
}

fn greedy_longest_match(word: &str, inventory: &GlyphInventory) -> Tokenization {
  // Byte offset of every char boundary, including the end of the word.
  let bounds: Vec<usize> = word.char_indices().map(|(i, _)| i).chain([word.len()]).collect();
  let n = bounds.len() - 1;

  let mut pieces = vec![];
  let mut pos = 0;

  while pos < n {
    let found = inventory.lengths().iter()
      .filter(|&&len| pos + len <= n)
      .map(|&len| (len, &word[bounds[pos] .. bounds[pos + len]]))
      .find(|(_, candidate)| inventory.contains(candidate));

    match found {
      Some((len, grapheme)) => {
        pieces.push(Piece::Grapheme(grapheme.to_owned()));
        pos += len;
      },
      None => {
        if let Some(c) = word[bounds[pos] ..].chars().next() {
          pieces.push(Piece::Residue(c));
        }
        pos += 1;
      }
    }
  }

  Tokenization { pieces }
}
