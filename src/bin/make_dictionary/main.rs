
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use console::style;
use script_realignment::conventions::Conventions;
use script_realignment::output::{read_text, write_all};
use script_realignment::pipeline::{generate_dictionaries, NamedText};
use script_realignment::tokenizer::MatchStrategy;
use script_realignment::Result;

/// Adds generated phonetic transcriptions for every transcript word missing
/// from the dictionary pair, and writes the updated pair.
#[derive(Parser, Debug)]
#[command()]
struct Args {
    /// Tab-separated transcript; the fifth column holds the text.
    #[arg()]
    transcript: PathBuf,
    /// Grapheme to phonetic-symbol table.
    #[arg()]
    glyphs: PathBuf,
    #[arg()]
    two_column_dict: PathBuf,
    #[arg()]
    three_column_dict: PathBuf,
    #[arg()]
    out_two_column: PathBuf,
    #[arg()]
    out_three_column: PathBuf,
    /// Where words with graphemes outside the table are listed.
    #[arg(long, default_value = "wordsWithoutArpabet.txt")]
    bad_words: PathBuf,
    /// JSON conventions file (glottal marker, punctuation, output folds).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    strategy: Option<MatchStrategy>,
}

fn name(p: &Path) -> String {
  p.display().to_string()
}

fn run(args: &Args) -> Result<()> {
  let mut conventions = match &args.config {
    Some(path) => Conventions::load(path)?,
    None => Conventions::default()
  };
  if let Some(strategy) = args.strategy {
    conventions.strategy = strategy;
  }

  let transcript = read_text(&args.transcript)?;
  let glyphs = read_text(&args.glyphs)?;
  let two_column = read_text(&args.two_column_dict)?;
  let three_column = read_text(&args.three_column_dict)?;

  let (n1, n2, n3, n4) = (name(&args.transcript), name(&args.glyphs), name(&args.two_column_dict), name(&args.three_column_dict));
  let res = generate_dictionaries(
    NamedText::new(&n1, &transcript),
    NamedText::new(&n2, &glyphs),
    NamedText::new(&n3, &two_column),
    NamedText::new(&n4, &three_column),
    &conventions,
  )?;

  write_all(&[
    (args.out_two_column.clone(), res.two_column),
    (args.out_three_column.clone(), res.three_column),
    (args.bad_words.clone(), res.unmapped_report),
  ])?;

  println!("Added {} new words.", res.new_words.len());
  if !res.unmapped.is_empty() {
    println!("{}", style(format!(
      "{} words have graphemes outside the table. Please see {}",
      res.unmapped.len(), args.bad_words.display()
    )).yellow());
  }

  Ok(())
}

fn main() -> ExitCode {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  match run(&args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("{} {}", style("error:").red().bold(), e);
      ExitCode::FAILURE
    }
  }
}
