//! The interests file: the user's self-declared focus areas.
//!
//! The pipeline only ever reads it or appends a new line to it. Existing
//! lines are never rewritten, reordered or removed; the user may hand-edit
//! the file between runs.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use starter_common::{Result, StarterError};
use tracing::info;

/// Handle to the interests file. Clones share one append lock, so runs that
/// share a handle never interleave their writes.
#[derive(Debug, Clone)]
pub struct InterestsStore {
    path: PathBuf,
    append_lock: Arc<Mutex<()>>,
}

impl InterestsStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents; empty if the file does not exist yet.
    pub fn read(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Append one entry as a new line, creating the file if needed.
    ///
    /// Line breaks inside `entry` are folded into spaces so one call always
    /// adds exactly one line. Blank entries are rejected.
    pub fn append(&self, entry: &str) -> Result<()> {
        let line = normalize_entry(entry)
            .ok_or_else(|| StarterError::Tool("interests entry must not be empty".to_string()))?;

        let _guard = self.append_lock.lock();

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut out = String::with_capacity(line.len() + 2);
        if !ends_with_newline(&mut file)? {
            out.push('\n');
        }
        out.push_str(&line);
        out.push('\n');
        file.write_all(out.as_bytes())?;
        file.flush()?;

        info!(path = %self.path.display(), entry = %line, "Appended interest");
        Ok(())
    }

    /// [`read`](Self::read) on the blocking pool, for async callers.
    pub async fn read_async(&self) -> Result<String> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.read())
            .await
            .map_err(|e| StarterError::Tool(format!("interests read task failed: {e}")))?
    }

    /// [`append`](Self::append) on the blocking pool, for async callers.
    pub async fn append_async(&self, entry: impl Into<String>) -> Result<()> {
        let store = self.clone();
        let entry = entry.into();
        tokio::task::spawn_blocking(move || store.append(&entry))
            .await
            .map_err(|e| StarterError::Tool(format!("interests append task failed: {e}")))?
    }
}

fn normalize_entry(entry: &str) -> Option<String> {
    let line = entry.split_whitespace().collect::<Vec<_>>().join(" ");
    (!line.is_empty()).then_some(line)
}

/// True for an empty file too: nothing needs separating.
fn ends_with_newline(file: &mut fs::File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
