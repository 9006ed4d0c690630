
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use tracing::warn;

use crate::error::{Error, Result};

/// Reads a whole input file, which must be UTF-8.
pub fn read_text(path: &Path) -> Result<String> {
  let bytes = fs::read(path).map_err(|e| Error::io("reading", path, e))?;
  String::from_utf8(bytes).map_err(|e| Error::Encoding {
    path: path.to_owned(),
    valid_up_to: e.utf8_error().valid_up_to(),
  })
}

/// Writes every output next to its destination first and only moves them
/// into place once all of them have been written. If moving one fails, the
/// outputs already moved get their previous contents back.
pub fn write_all(outputs: &[(PathBuf, String)]) -> Result<()> {
  let mut staged: Vec<Staged> = vec![];

  for (path, contents) in outputs {
    let dir = match path.parent() {
      Some(p) if !p.as_os_str().is_empty() => p,
      _ => Path::new(".")
    };
    let mut file = Builder::new().prefix(".staged-").suffix(".tmp").tempfile_in(dir)
      .map_err(|e| Error::io("creating a staging file for", path, e))?;
    file.write_all(contents.as_bytes()).map_err(|e| Error::io("writing", path, e))?;
    file.flush().map_err(|e| Error::io("writing", path, e))?;

    let backup = if path.is_file() {
      let backup = Builder::new().prefix(".previous-").suffix(".tmp").tempfile_in(dir)
        .map_err(|e| Error::io("backing up", path, e))?;
      fs::copy(path, backup.path()).map_err(|e| Error::io("backing up", path, e))?;
      Some(backup)
    }
    else {
      None
    };

    staged.push(Staged { file, path: path.as_path(), backup });
  }

  let mut replaced: Vec<(&Path, Option<NamedTempFile>)> = vec![];
  for s in staged {
    match s.file.persist(s.path) {
      Ok(_) => replaced.push((s.path, s.backup)),
      Err(e) => {
        roll_back(replaced);
        return Err(Error::io("replacing", s.path, e.error));
      }
    }
  }

  Ok(())
}

struct Staged<'a> {
  file: NamedTempFile,
  path: &'a Path,
  // The destination's contents before this run, if it existed.
  backup: Option<NamedTempFile>,
}

fn roll_back(replaced: Vec<(&Path, Option<NamedTempFile>)>) {
  for (path, backup) in replaced.into_iter().rev() {
    let res = match backup {
      Some(b) => b.persist(path).map(|_| ()).map_err(|e| e.error),
      None => fs::remove_file(path)
    };
    if let Err(e) = res {
      warn!(path = %path.display(), error = %e, "could not restore previous contents");
    }
  }
}
