//! Document conversion strategies.
//!
//! DOCX goes through structured table extraction first; plain text per
//! line is the shared fallback for everything else, including legacy
//! `.doc` files read as a lossy byte stream the way their original
//! ingestion did (the binary Word reader was never part of this system).

use std::path::Path;

use encoding_rs::Encoding;

use crate::archive::Archive;
use crate::common::error::{Error, Result};
use crate::convert::Strategy;
use crate::ooxml::docx;
use crate::sheet::Table;

/// Structured extraction from the WordprocessingML body.
pub struct DocxTables;

impl Strategy for DocxTables {
    fn name(&self) -> &'static str {
        "docx-tables"
    }

    fn convert(&self, input: &Path) -> Result<Table> {
        let mut archive = Archive::open(input)?;
        docx::read_document(&mut archive)
    }
}

/// Decode the file as text, one row per non-blank line.
pub struct PlainTextLines;

impl Strategy for PlainTextLines {
    fn name(&self) -> &'static str {
        "plain-text"
    }

    fn convert(&self, input: &Path) -> Result<Table> {
        let data = std::fs::read(input)?;
        let text = decode_text(&data);
        // Binary .doc payloads leave control bytes between readable
        // spans; blank them so tokenization sees clean separators.
        let cleaned: String = text
            .chars()
            .map(|c| if c.is_control() && c != '\n' { ' ' } else { c })
            .collect();
        let lines: Vec<&str> = cleaned.lines().collect();
        let rows = docx::lines_to_rows(&lines);
        if rows.is_empty() {
            return Err(Error::Format("no text lines in input".to_string()));
        }
        Ok(rows)
    }
}

/// Extract the text layer of a PDF, one row per non-blank line.
pub struct PdfText;

impl Strategy for PdfText {
    fn name(&self) -> &'static str {
        "pdf-text"
    }

    fn convert(&self, input: &Path) -> Result<Table> {
        let text = pdf_extract::extract_text(input)
            .map_err(|e| Error::Format(format!("PDF text extraction failed: {e}")))?;
        let lines: Vec<&str> = text.lines().collect();
        let rows = docx::lines_to_rows(&lines);
        if rows.is_empty() {
            return Err(Error::Format("PDF has no extractable text".to_string()));
        }
        Ok(rows)
    }
}

/// Decode bytes with the first encoding that accepts them losslessly,
/// falling back to lossy UTF-8.
fn decode_text(data: &[u8]) -> String {
    for label in ["utf-8", "windows-1251"] {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            let (text, _, had_errors) = encoding.decode(data);
            if !had_errors {
                return text.into_owned();
            }
        }
    }
    String::from_utf8_lossy(data).into_owned()
}
