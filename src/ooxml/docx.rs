//! Tabular extraction from WordprocessingML documents.
//!
//! Supplier price lists occasionally arrive as `.docx` files whose body
//! is one big table. Extraction is table-first: every table row becomes a
//! data row; only when the document has no tables at all do paragraph
//! lines stand in as single-column rows.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::archive::Archive;
use crate::common::error::{Error, Result};
use crate::sheet::{CellValue, RawCell, RawRow, Table};

/// Main document part of a WordprocessingML package.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Extract the tabular content of a `.docx` archive.
pub fn read_document(archive: &mut Archive) -> Result<Table> {
    let xml = archive.read_ignore_case(DOCUMENT_PART)?;
    let body = parse_document(&xml)?;

    let rows = if body.table_rows.is_empty() {
        log::debug!(
            "document has no tables, using {} paragraph lines",
            body.paragraphs.len()
        );
        lines_to_rows(&body.paragraphs)
    } else {
        table_rows_to_rows(&body.table_rows)
    };
    Ok(rows)
}

/// Turn plain text lines into single-column rows, one per non-blank line.
pub fn lines_to_rows<S: AsRef<str>>(lines: &[S]) -> Table {
    let mut rows = Vec::new();
    let mut index = 0u32;
    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        index += 1;
        let mut row = RawRow::new(index);
        row.push(RawCell::new(index, 1, CellValue::Text(line.to_string())));
        rows.push(row);
    }
    rows
}

fn table_rows_to_rows(table_rows: &[Vec<String>]) -> Table {
    let mut rows = Vec::new();
    for (i, cells) in table_rows.iter().enumerate() {
        let index = (i + 1) as u32;
        let mut row = RawRow::new(index);
        for (j, text) in cells.iter().enumerate() {
            let value = if text.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(text.trim().to_string())
            };
            row.push(RawCell::new(index, (j + 1) as u32, value));
        }
        rows.push(row);
    }
    rows
}

#[derive(Default)]
struct DocumentBody {
    table_rows: Vec<Vec<String>>,
    paragraphs: Vec<String>,
}

fn parse_document(xml: &[u8]) -> Result<DocumentBody> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut body = DocumentBody::default();
    let mut buf = Vec::new();

    let mut table_depth = 0usize;
    let mut in_cell = false;
    let mut in_text = false;
    let mut current_cell = String::new();
    let mut current_row: Vec<String> = Vec::new();
    let mut current_para = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"tbl" => table_depth += 1,
                b"tr" if table_depth > 0 => current_row.clear(),
                b"tc" if table_depth > 0 => {
                    in_cell = true;
                    current_cell.clear();
                },
                b"p" if table_depth == 0 => current_para.clear(),
                b"t" => in_text = true,
                _ => {},
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"br" | b"tab" => {
                    if in_cell {
                        current_cell.push(' ');
                    } else if table_depth == 0 {
                        current_para.push(' ');
                    }
                },
                _ => {},
            },
            Ok(Event::Text(ref t)) if in_text => {
                let text = t.unescape().map_err(|e| Error::Xml(e.to_string()))?;
                if in_cell {
                    current_cell.push_str(&text);
                } else if table_depth == 0 {
                    current_para.push_str(&text);
                }
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"tc" if table_depth > 0 => {
                    in_cell = false;
                    current_row.push(std::mem::take(&mut current_cell));
                },
                b"tr" if table_depth > 0 => {
                    if !current_row.iter().all(|c| c.trim().is_empty()) {
                        body.table_rows.push(std::mem::take(&mut current_row));
                    }
                },
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                b"p" if table_depth == 0 => {
                    let text = current_para.trim();
                    if !text.is_empty() {
                        body.paragraphs.push(text.to_string());
                    }
                },
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Format(format!("document parse error: {e}"))),
            _ => {},
        }
        buf.clear();
    }

    Ok(body)
}
