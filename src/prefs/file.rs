use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::PrefsStore;

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("failed to read prefs file: {0}")]
    Io(#[from] std::io::Error),
    #[error("prefs file is not valid RON: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to encode prefs: {0}")]
    Encode(#[from] ron::Error),
}

/// Durable store backed by a single RON file. Every mutation rewrites the
/// file through a temporary sibling, so a crash mid-write never leaves a
/// half-written prefs file behind.
#[derive(Debug)]
pub struct FilePrefs {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FilePrefs {
    /// Loads the store at `path`, creating parent directories as needed.
    /// A missing file starts the store empty; an unreadable or unparsable
    /// file is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PrefsError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let entries: BTreeMap<String, String> = match fs::read_to_string(&path) {
            Ok(raw) => ron::from_str(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(
            target: "prefs",
            path = %path.display(),
            entries = entries.len(),
            "prefs file opened"
        );
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) {
        if let Err(err) = self.try_flush() {
            tracing::error!(
                target: "prefs",
                path = %self.path.display(),
                %err,
                "failed to write prefs file"
            );
        }
    }

    fn try_flush(&self) -> Result<(), PrefsError> {
        let raw = ron::ser::to_string_pretty(&self.entries, ron::ser::PrettyConfig::default())?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        staged.write_all(raw.as_bytes())?;
        staged
            .persist(&self.path)
            .map_err(|err| PrefsError::Io(err.error))?;
        Ok(())
    }
}

impl PrefsStore for FilePrefs {
    fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
        self.flush();
    }

    fn delete(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.flush();
        }
    }
}
