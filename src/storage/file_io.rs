//! Atomic file writes
//!
//! Backup files and the settings file are replaced, never truncated in place,
//! so an interrupted run leaves the previous version intact.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::{PolicyError, PolicyResult};

/// Write pretty JSON to a file atomically (write to temp, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> PolicyResult<()>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            PolicyError::Io(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| {
        PolicyError::Io(format!(
            "Failed to create temp file {}: {}",
            temp_path.display(),
            e
        ))
    })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| PolicyError::Json(format!("Failed to serialize {}: {}", path.display(), e)))?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| PolicyError::Io(format!("Failed to flush {}: {}", temp_path.display(), e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| PolicyError::Io(format!("Failed to sync {}: {}", temp_path.display(), e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        PolicyError::Io(format!("Failed to replace {}: {}", path.display(), e))
    })?;

    Ok(())
}
