//! Whole-file JSON persistence for a [`Corpus`].

use biomatch_core::{Corpus, Error, Result};
use std::io::Write;
use std::path::Path;

/// Load a persisted corpus.
///
/// - `Ok(None)` if nothing has been saved at `path` yet.
/// - `Err(Error::CorpusLoad)` if the file exists but cannot be read or parsed.
pub fn load(path: &Path) -> Result<Option<Corpus>> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::CorpusLoad(format!("{}: {e}", path.display()))),
    };
    let corpus: Corpus = serde_json::from_slice(&bytes)
        .map_err(|e| Error::CorpusLoad(format!("{}: {e}", path.display())))?;
    Ok(Some(corpus))
}

/// Overwrite `path` with `corpus`.
///
/// The JSON is written to a temp file next to `path` and renamed into place, so
/// readers see either the old store or the new one.
pub fn save(path: &Path, corpus: &Corpus) -> Result<()> {
    let err = |e: &dyn std::fmt::Display| Error::CorpusSave(format!("{}: {e}", path.display()));

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| err(&e))?;

    let bytes = serde_json::to_vec(corpus).map_err(|e| err(&e))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| err(&e))?;
    tmp.write_all(&bytes).map_err(|e| err(&e))?;
    tmp.as_file().sync_all().map_err(|e| err(&e))?;
    tmp.persist(path).map_err(|e| err(&e.error))?;
    Ok(())
}
