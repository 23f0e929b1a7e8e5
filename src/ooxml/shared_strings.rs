//! Shared strings table of an OOXML spreadsheet.
//!
//! Worksheet cells of type `s` store an index into this deduplicated
//! string pool rather than the text itself. A string item (`<si>`) may be
//! split across several text runs (`<t>`) by rich-text formatting; the
//! logical string is the concatenation of all runs in document order.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::archive::Archive;
use crate::common::error::{Error, Result};

/// Canonical part name; real files vary the casing, so lookup is
/// case-insensitive.
pub const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Ordered string pool, owned by a single parse operation.
#[derive(Debug, Default)]
pub struct SharedStringTable {
    strings: Vec<String>,
}

impl SharedStringTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the shared strings of an archive.
    ///
    /// An absent part is not an error: inline strings and numbers remain
    /// usable, so the table simply comes back empty. A present but
    /// malformed part is a hard [`Error::Format`].
    pub fn from_archive(archive: &mut Archive) -> Result<Self> {
        match archive.find_ignore_case(SHARED_STRINGS_PART) {
            Some(actual) => {
                let actual = actual.to_string();
                let xml = archive.read(&actual)?;
                let table = Self::parse(&xml)?;
                log::debug!("loaded {} shared strings from {actual}", table.len());
                Ok(table)
            },
            None => {
                log::debug!("archive has no shared strings part");
                Ok(Self::new())
            },
        }
    }

    /// Parse the `sharedStrings.xml` payload.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut strings = Vec::new();
        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_item = false;
        let mut in_text = false;
        let mut in_phonetic = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"si" => {
                        in_item = true;
                        current.clear();
                    },
                    b"t" if in_item && !in_phonetic => in_text = true,
                    // Phonetic runs carry furigana, not cell text.
                    b"rPh" => in_phonetic = true,
                    _ => {},
                },
                Ok(Event::Text(ref t)) if in_text => {
                    let text = t
                        .unescape()
                        .map_err(|e| Error::Format(format!("shared strings: {e}")))?;
                    current.push_str(&text);
                },
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"t" => in_text = false,
                    b"rPh" => in_phonetic = false,
                    b"si" => {
                        in_item = false;
                        strings.push(std::mem::take(&mut current));
                    },
                    _ => {},
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Format(format!("shared strings parse error: {e}")));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(Self { strings })
    }

    /// Get a string by its index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    /// Resolve the raw `<v>` payload of a shared-string cell.
    ///
    /// An out-of-bounds or non-numeric index degrades to the literal
    /// payload text instead of failing the row.
    pub fn resolve(&self, raw: &str) -> String {
        match atoi_simd::parse::<usize>(raw.trim().as_bytes()) {
            Ok(index) => match self.get(index) {
                Some(text) => text.to_string(),
                None => {
                    log::debug!(
                        "shared string index {index} out of bounds (table has {})",
                        self.len()
                    );
                    raw.to_string()
                },
            },
            Err(_) => raw.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
