//! Read-only access to ZIP containers.
//!
//! OOXML spreadsheets and documents are ZIP archives of XML parts. This
//! module provides the raw container view used by the last-resort
//! conversion strategies when the high-level readers have already failed:
//! entry listing, exact reads, and case-insensitive reads (spreadsheet
//! producers disagree on part-name casing, `xl/sharedStrings.xml` vs
//! `xl/SharedStrings.xml` being the classic offender).

use std::io::{Cursor, Read};
use std::path::Path;

use zip::ZipArchive;

use crate::common::detection::{self, Container};
use crate::common::error::{Error, Result};

/// Read-only view over one ZIP container for the duration of one parse.
#[derive(Debug)]
pub struct Archive {
    zip: ZipArchive<Cursor<Vec<u8>>>,
    names: Vec<String>,
}

impl Archive {
    /// Open a container from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Open a container from an owned byte buffer.
    ///
    /// Fails with [`Error::Format`] when the leading magic or the central
    /// directory is invalid, before any entry is touched.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if detection::sniff_container(&data) != Container::Zip {
            return Err(Error::Format("not a ZIP container".to_string()));
        }
        if !detection::has_central_directory(&data) {
            return Err(Error::Format(
                "ZIP central directory missing or truncated".to_string(),
            ));
        }
        let zip = ZipArchive::new(Cursor::new(data))
            .map_err(|e| Error::Format(format!("ZIP open failed: {e}")))?;
        let names = zip.file_names().map(str::to_string).collect();
        Ok(Self { zip, names })
    }

    /// Names of all entries, in central-directory order.
    pub fn entry_names(&self) -> &[String] {
        &self.names
    }

    /// Whether an entry with this exact name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Find an entry by case-insensitive name match, returning the
    /// actual stored name.
    pub fn find_ignore_case(&self, name: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|n| n.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    /// Read an entry by its exact name.
    pub fn read(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut entry = self
            .zip
            .by_name(name)
            .map_err(|_| Error::EntryNotFound(name.to_string()))?;
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read an entry by case-insensitive name match.
    pub fn read_ignore_case(&mut self, name: &str) -> Result<Vec<u8>> {
        let actual = self
            .find_ignore_case(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?
            .to_string();
        self.read(&actual)
    }
}
