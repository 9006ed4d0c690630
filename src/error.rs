
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{source_name}:{line}: {message}")]
  Parse {
    source_name: String,
    line: usize,
    message: String,
  },
  #[error("{}: not valid UTF-8 (first bad byte at offset {valid_up_to})", .path.display())]
  Encoding {
    path: PathBuf,
    valid_up_to: usize,
  },
  #[error("I/O error while {context} '{}': {source}", .path.display())]
  Io {
    context: &'static str,
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("invalid conventions file '{}': {source}", .path.display())]
  Config {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

impl Error {
  pub(crate) fn parse(source_name: &str, line: usize, message: impl Into<String>) -> Self {
    Self::Parse {
      source_name: source_name.to_owned(),
      line,
      message: message.into(),
    }
  }

  pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io {
      context,
      path: path.into(),
      source,
    }
  }
}

pub type Result<T> = std::result::Result<T, Error>;
