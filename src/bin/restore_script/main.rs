
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use console::style;
use script_realignment::conventions::Conventions;
use script_realignment::output::{read_text, write_all};
use script_realignment::pipeline::{restore_script, NamedText};
use script_realignment::Result;

/// Replaces the phone labels of an aligned TextGrid with the graphemes from a
/// three-column dictionary.
#[derive(Parser, Debug)]
#[command()]
struct Args {
    /// TextGrid with a phone tier followed by a word tier.
    #[arg()]
    textgrid: PathBuf,
    #[arg()]
    three_column_dict: PathBuf,
    #[arg()]
    out: PathBuf,
    #[arg(long)]
    config: Option<PathBuf>,
}

fn run(args: &Args) -> Result<()> {
  let conventions = match &args.config {
    Some(path) => Conventions::load(path)?,
    None => Conventions::default()
  };

  let grid = read_text(&args.textgrid)?;
  let dict = read_text(&args.three_column_dict)?;
  let (grid_name, dict_name) = (args.textgrid.display().to_string(), args.three_column_dict.display().to_string());

  let res = restore_script(NamedText::new(&grid_name, &grid), NamedText::new(&dict_name, &dict), &conventions)?;

  write_all(&[(args.out.clone(), res.textgrid)])?;

  let r = &res.report;
  println!("Restored {} words.", r.substituted);
  if !r.missing.is_empty() {
    println!("{}", style(format!("{} words are not in the dictionary.", r.missing.len())).dim());
  }
  for m in &r.mismatches {
    println!("{}", style(format!(
      "Kept aligner labels for '{}' (interval {}): {} phones, dictionary has {:?}",
      m.word, m.word_index + 1, m.phone_count, m.script_lengths
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
