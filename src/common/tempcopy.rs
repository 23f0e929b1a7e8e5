//! Scoped temporary duplication of input files.
//!
//! Every conversion strategy runs against a fresh copy of the caller's
//! file so that a misbehaving parser can never corrupt the original and
//! concurrent parses never contend on the same handle. The copy lives in
//! the system temp directory and is removed when the guard drops, on
//! every exit path including panic unwinding.

use std::io::Write;
use std::path::Path;

use tempfile::TempPath;

use crate::common::error::Result;

/// RAII guard over a temporary duplicate of an input file.
#[derive(Debug)]
pub struct TempCopy {
    path: TempPath,
}

impl TempCopy {
    /// Duplicate `source` into the temp directory, preserving its
    /// extension so downstream libraries that dispatch on suffix keep
    /// working.
    pub fn of(source: &Path) -> Result<Self> {
        let suffix = source
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let file = tempfile::Builder::new()
            .prefix("kalyna-")
            .suffix(&suffix)
            .tempfile()?;
        std::fs::copy(source, file.path())?;
        log::debug!(
            "duplicated {} to {}",
            source.display(),
            file.path().display()
        );
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    /// Materialize an in-memory payload as a temp file with the given
    /// extension (no leading dot).
    pub fn from_bytes(data: &[u8], extension: &str) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("kalyna-")
            .suffix(&format!(".{extension}"))
            .tempfile()?;
        file.write_all(data)?;
        file.flush()?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    /// Path of the duplicate; valid until the guard drops.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
