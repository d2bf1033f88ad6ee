use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::ingest::{ingest, IngestStats, ParseMode};
use crate::storage::{Db, Options};

/// Destroys anything at `path` and creates a fresh storage instance there
/// with the given retention.
pub fn init<P: AsRef<Path>>(path: P, retention_days: u64) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        fs::remove_dir_all(path)
            .map_err(|e| (format!("failed to clear {}", path.display()), e))?;
    }
    fs::create_dir_all(path)
        .map_err(|e| (format!("failed to create {}", path.display()), e))?;

    Db::open(path, Options::with_retention_days(retention_days))?.close()
}

/// Ingests one exposition-format buffer into the storage at `path` as a
/// single transaction.
pub fn load<P: AsRef<Path>>(path: P, content: &str, mode: ParseMode) -> Result<IngestStats> {
    let mut db = Db::open(path, Options::default())?;

    let result = ingest(&mut db.appender(), content, mode);

    // The storage is released on the error path too.
    db.close()?;
    result
}
