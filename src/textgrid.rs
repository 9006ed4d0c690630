
//! Two-tier Praat TextGrids as written by the forced aligner: phones in the
//! first tier, words in the second.
//!
//! Only the interval records are interpreted. Everything else (the file
//! header, the block between the tiers, trailing blank lines) is carried as
//! raw text, and every record keeps its original lines, so rendering an
//! unmodified grid gives back the input byte for byte.

use lazy_static::lazy_static;
use nom::IResult;
use nom::bytes::complete::tag;
use nom::character::complete::{char, digit1, space0};
use nom::combinator::{all_consuming, map_res};
use nom::number::complete::double;
use nom::sequence::tuple;
use regex::Regex;

use crate::error::{Error, Result};

lazy_static! {
  static ref TIER_START_RE: Regex = Regex::new(r"^\s*item\s*\[\d+\]:\s*$").unwrap();
}

const SIZE_MARK: &str = "intervals: size";

#[derive(Clone, Debug, PartialEq)]
pub struct Interval {
  pub start: f64,
  pub end: f64,
  pub text: String,
}

impl Interval {
  pub fn new(start: f64, end: f64, text: &str) -> Interval {
    Interval { start, end, text: text.to_owned() }
  }

  pub fn contains(&self, other: &Interval) -> bool {
    other.start >= self.start && other.end <= self.end
  }
}

// The raw lines of one record, minus the text between the quotes.
#[derive(Clone, Debug, PartialEq)]
struct RecordLayout {
  id_line: String,
  xmin_line: String,
  xmax_line: String,
  text_prefix: String,
  text_suffix: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tier {
  intervals: Vec<Interval>,
  layouts: Vec<RecordLayout>,
}

impl Tier {
  /// A tier with Praat's usual record layout, for building grids in code.
  pub fn from_intervals(intervals: Vec<Interval>) -> Tier {
    let layouts = intervals.iter().enumerate().map(|(i, iv)| RecordLayout {
      id_line: format!("        intervals [{}]:\n", i + 1),
      xmin_line: format!("            xmin = {}\n", iv.start),
      xmax_line: format!("            xmax = {}\n", iv.end),
      text_prefix: "            text = \"".to_owned(),
      text_suffix: "\"\n".to_owned(),
    }).collect();
    Tier { intervals, layouts }
  }

  pub fn intervals(&self) -> &[Interval] {
    &self.intervals
  }

  pub fn texts(&self) -> Vec<&str> {
    self.intervals.iter().map(|i| i.text.as_str()).collect()
  }

  pub fn len(&self) -> usize {
    self.intervals.len()
  }

  pub fn is_empty(&self) -> bool {
    self.intervals.is_empty()
  }

  pub fn set_text(&mut self, index: usize, text: &str) {
    if let Some(iv) = self.intervals.get_mut(index) {
      iv.text = text.to_owned();
    }
  }

  fn push(&mut self, interval: Interval, layout: RecordLayout) {
    self.intervals.push(interval);
    self.layouts.push(layout);
  }

  fn render_into(&self, out: &mut String) {
    for (iv, l) in self.intervals.iter().zip(&self.layouts) {
      out.push_str(&l.id_line);
      out.push_str(&l.xmin_line);
      out.push_str(&l.xmax_line);
      out.push_str(&l.text_prefix);
      out.push_str(&iv.text);
      out.push_str(&l.text_suffix);
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextGrid {
  pub header: String,
  pub phones: Tier,
  pub middle: String,
  pub words: Tier,
  pub trailer: String,
}

impl TextGrid {
  pub fn parse(text: &str, source_name: &str) -> Result<TextGrid> {
    let mut c = Cursor { lines: text.split_inclusive('\n').collect(), pos: 0, source_name };

    let (header, phone_count) = c.take_through_size_line("the phone tier")?;
    let phone_count_line = c.pos;

    let mut phones = Tier::default();
    loop {
      match c.peek() {
        None => return Err(c.error_here("input ended inside the phone tier; no second tier found")),
        Some(line) if TIER_START_RE.is_match(content(line)) => break,
        Some(_) => {
          let (interval, layout) = c.take_record()?;
          phones.push(interval, layout);
        }
      }
    }

    let (middle, word_count) = c.take_through_size_line("the word tier")?;
    let word_count_line = c.pos;

    let mut words = Tier::default();
    while !c.rest_is_blank() {
      let (interval, layout) = c.take_record()?;
      words.push(interval, layout);
    }
    let trailer = c.take_rest();

    if phones.len() != phone_count {
      return Err(Error::parse(source_name, phone_count_line,
        format!("phone tier declares {} intervals but has {}", phone_count, phones.len())));
    }
    if words.len() != word_count {
      return Err(Error::parse(source_name, word_count_line,
        format!("word tier declares {} intervals but has {}", word_count, words.len())));
    }

    Ok(TextGrid { header, phones, middle, words, trailer })
  }

  pub fn render(&self) -> String {
    let mut out = String::new();
    out.push_str(&self.header);
    self.phones.render_into(&mut out);
    out.push_str(&self.middle);
    self.words.render_into(&mut out);
    out.push_str(&self.trailer);
    out
  }
}

struct Cursor<'a> {
  lines: Vec<&'a str>,
  pos: usize,
  source_name: &'a str,
}

impl<'a> Cursor<'a> {
  fn peek(&self) -> Option<&'a str> {
    self.lines.get(self.pos).copied()
  }

  fn next_line(&mut self, what: &str) -> Result<&'a str> {
    match self.lines.get(self.pos).copied() {
      Some(line) => {
        self.pos += 1;
        Ok(line)
      },
      None => Err(self.error_here(format!("input ended, expected {}", what)))
    }
  }

  // 1-based number of the line at `pos`.
  fn line_no(&self) -> usize {
    self.pos + 1
  }

  fn error_here(&self, message: impl Into<String>) -> Error {
    Error::parse(self.source_name, self.line_no(), message)
  }

  fn error_prev(&self, message: impl Into<String>) -> Error {
    Error::parse(self.source_name, self.pos, message)
  }

  fn take_through_size_line(&mut self, tier: &str) -> Result<(String, usize)> {
    let mut block = String::new();
    loop {
      let line = self.next_line(&format!("an `{}` line for {}", SIZE_MARK, tier))?;
      block.push_str(line);
      if content(line).contains(SIZE_MARK) {
        let count = run(interval_count, content(line))
          .ok_or_else(|| self.error_prev("malformed interval count"))?;
        return Ok((block, count));
      }
    }
  }

  fn take_record(&mut self) -> Result<(Interval, RecordLayout)> {
    let id_line = self.next_line("`intervals [n]:`")?;
    run(interval_id, content(id_line))
      .ok_or_else(|| self.error_prev(format!("expected `intervals [n]:`, found `{}`", content(id_line).trim())))?;

    let xmin_line = self.next_line("`xmin = ...`")?;
    let start = run(bound("xmin"), content(xmin_line))
      .ok_or_else(|| self.error_prev(format!("expected `xmin = <number>`, found `{}`", content(xmin_line).trim())))?;

    let xmax_line = self.next_line("`xmax = ...`")?;
    let end = run(bound("xmax"), content(xmax_line))
      .ok_or_else(|| self.error_prev(format!("expected `xmax = <number>`, found `{}`", content(xmax_line).trim())))?;

    let text_line = self.next_line("`text = \"...\"`")?;
    let (prefix, text, suffix) = split_text_line(text_line)
      .ok_or_else(|| self.error_prev(format!("expected `text = \"...\"`, found `{}`", content(text_line).trim())))?;

    Ok((
      Interval { start, end, text: text.to_owned() },
      RecordLayout {
        id_line: id_line.to_owned(),
        xmin_line: xmin_line.to_owned(),
        xmax_line: xmax_line.to_owned(),
        text_prefix: prefix.to_owned(),
        text_suffix: suffix.to_owned(),
      }
    ))
  }

  fn rest_is_blank(&self) -> bool {
    self.lines[self.pos ..].iter().all(|l| l.trim().is_empty())
  }

  fn take_rest(&mut self) -> String {
    let rest = self.lines[self.pos ..].concat();
    self.pos = self.lines.len();
    rest
  }
}

fn content(line: &str) -> &str {
  line.trim_end_matches(['\r', '\n'])
}

fn run<'a, O>(parser: impl FnMut(&'a str) -> IResult<&'a str, O>, input: &'a str) -> Option<O> {
  all_consuming(parser)(input).ok().map(|(_, o)| o)
}

fn interval_count(i: &str) -> IResult<&str, usize> {
  let (i, _) = tuple((space0, tag("intervals:"), space0, tag("size"), space0, char('='), space0))(i)?;
  let (i, n) = map_res(digit1, |s: &str| s.parse::<usize>())(i)?;
  let (i, _) = space0(i)?;
  Ok((i, n))
}

fn interval_id(i: &str) -> IResult<&str, usize> {
  let (i, _) = tuple((space0, tag("intervals"), space0, char('[')))(i)?;
  let (i, n) = map_res(digit1, |s: &str| s.parse::<usize>())(i)?;
  let (i, _) = tuple((char(']'), char(':'), space0))(i)?;
  Ok((i, n))
}

fn bound<'a>(name: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, f64> {
  move |i| {
    let (i, _) = tuple((space0, tag(name), space0, char('='), space0))(i)?;
    let (i, v) = double(i)?;
    let (i, _) = space0(i)?;
    Ok((i, v))
  }
}

fn text_opening(i: &str) -> IResult<&str, ()> {
  let (i, _) = tuple((space0, tag("text"), space0, char('='), space0, char('"')))(i)?;
  Ok((i, ()))
}

// Splits `    text = "abc"\r\n` into (`    text = "`, `abc`, `"\r\n`).
fn split_text_line(line: &str) -> Option<(&str, &str, &str)> {
  let body = content(line);
  let (rest, _) = text_opening(body).ok()?;
  let open = body.len() - rest.len();
  let close = open + rest.trim_end_matches([' ', '\t']).strip_suffix('"')?.len();
  Some((&line[.. open], &line[open .. close], &line[close ..]))
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use more_asserts::assert_lt;

  pub(crate) const GRID: &str = "File type = \"ooTextFile\"\r\n\
Object class = \"TextGrid\"\r\n\
\r\n\
xmin = 0\r\n\
xmax = 1.5\r\n\
tiers? <exists>\r\n\
size = 2\r\n\
item []:\r\n\
\titem [1]:\r\n\
\t\tclass = \"IntervalTier\"\r\n\
\t\tname = \"phone\"\r\n\
\t\txmin = 0\r\n\
\t\txmax = 1.5\r\n\
\t\tintervals: size = 3\r\n\
\t\t\tintervals [1]:\r\n\
\t\t\txmin = 0.0\r\n\
\t\t\txmax = 0.5\r\n\
\t\t\ttext = \"T\"\r\n\
\t\t\tintervals [2]:\r\n\
\t\t\txmin = 0.5\r\n\
\t\t\txmax = 1.0\r\n\
\t\t\ttext = \"EH1\"\r\n\
\t\t\tintervals [3]:\r\n\
\t\t\txmin = 1.0\r\n\
\t\t\txmax = 1.5\r\n\
\t\t\ttext = \"sp\"\r\n\
\titem [2]:\r\n\
\t\tclass = \"IntervalTier\"\r\n\
\t\tname = \"word\"\r\n\
\t\txmin = 0\r\n\
\t\txmax = 1.5\r\n\
\t\tintervals: size = 2\r\n\
\t\t\tintervals [1]:\r\n\
\t\t\txmin = 0.0\r\n\
\t\t\txmax = 1.0\r\n\
\t\t\ttext = \"TE\"\r\n\
\t\t\tintervals [2]:\r\n\
\t\t\txmin = 1.0\r\n\
\t\t\txmax = 1.5\r\n\
\t\t\ttext = \"\"\r\n";

  #[test]
  fn test_parse_tiers() {
    let g = TextGrid::parse(GRID, "a.TextGrid").unwrap();
    assert_eq!(g.phones.texts(), vec!["T", "EH1", "sp"]);
    assert_eq!(g.words.texts(), vec!["TE", ""]);
    assert_eq!(g.phones.intervals()[1], Interval::new(0.5, 1.0, "EH1"));
    assert!(g.header.ends_with("intervals: size = 3\r\n"));
    assert!(g.middle.starts_with("\titem [2]:\r\n"));
    assert!(g.middle.ends_with("intervals: size = 2\r\n"));
    assert_eq!(g.trailer, "");
  }

  #[test]
  fn test_render_is_byte_identical() {
    let g = TextGrid::parse(GRID, "a.TextGrid").unwrap();
    assert_eq!(g.render(), GRID);
  }

  #[test]
  fn test_render_keeps_lf_files_and_trailing_blank_lines() {
    let lf = GRID.replace("\r\n", "\n") + "\n\n";
    let g = TextGrid::parse(&lf, "a.TextGrid").unwrap();
    assert_eq!(g.trailer, "\n\n");
    assert_eq!(g.render(), lf);
  }

  #[test]
  fn test_set_text_only_changes_text() {
    let mut g = TextGrid::parse(GRID, "a.TextGrid").unwrap();
    g.phones.set_text(1, "e");
    let expected = GRID.replacen("text = \"EH1\"", "text = \"e\"", 1);
    assert_eq!(g.render(), expected);
  }

  #[test]
  fn test_text_with_doubled_quotes_is_kept_raw() {
    let grid = GRID.replace("text = \"TE\"", "text = \"say \"\"hi\"\"\"");
    let g = TextGrid::parse(&grid, "a.TextGrid").unwrap();
    assert_eq!(g.words.texts()[0], "say \"\"hi\"\"");
    assert_eq!(g.render(), grid);
  }

  #[test]
  fn test_bounds_are_ordered() {
    let g = TextGrid::parse(GRID, "a.TextGrid").unwrap();
    for iv in g.phones.intervals() {
      assert_lt!(iv.start, iv.end);
    }
  }

  #[test]
  fn test_bad_record_reports_line() {
    let grid = GRID.replacen("\t\t\txmax = 0.5\r\n", "\t\t\tend = 0.5\r\n", 1);
    match TextGrid::parse(&grid, "a.TextGrid") {
      Err(Error::Parse { source_name, line, message }) => {
        assert_eq!(source_name, "a.TextGrid");
        assert_eq!(line, 17);
        assert!(message.contains("xmax"), "{}", message);
      },
      other => panic!("unexpected {:?}", other)
    }
  }

  #[test]
  fn test_bad_number_is_rejected() {
    let grid = GRID.replacen("xmin = 0.5", "xmin = half", 1);
    assert!(matches!(TextGrid::parse(&grid, "a.TextGrid"), Err(Error::Parse { line: 20, .. })));
  }

  #[test]
  fn test_truncated_record() {
    let grid = GRID.trim_end_matches("\t\t\ttext = \"\"\r\n");
    assert!(matches!(TextGrid::parse(grid, "a.TextGrid"), Err(Error::Parse { .. })));
  }

  #[test]
  fn test_missing_second_tier() {
    let end = GRID.find("\titem [2]:").unwrap();
    assert!(matches!(TextGrid::parse(&GRID[.. end], "a.TextGrid"), Err(Error::Parse { .. })));
  }

  #[test]
  fn test_size_mismatch() {
    let grid = GRID.replacen("intervals: size = 3", "intervals: size = 4", 1);
    match TextGrid::parse(&grid, "a.TextGrid") {
      Err(Error::Parse { message, line, .. }) => {
        assert_eq!(line, 14);
        assert!(message.contains("declares 4"), "{}", message);
      },
      other => panic!("unexpected {:?}", other)
    }
  }

  #[test]
  fn test_point_tier_is_rejected() {
    assert!(matches!(TextGrid::parse("File type = \"ooTextFile\"\npoints: size = 0\n", "p.TextGrid"), Err(Error::Parse { .. })));
  }

  #[test]
  fn test_from_intervals_round_trips() {
    let tier = Tier::from_intervals(vec![Interval::new(0.0, 0.5, "T")]);
    let mut out = String::new();
    tier.render_into(&mut out);
    assert_eq!(out, "        intervals [1]:\n            xmin = 0\n            xmax = 0.5\n            text = \"T\"\n");
  }
}
