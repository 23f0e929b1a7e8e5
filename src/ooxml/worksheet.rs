//! Worksheet grid scanning for OOXML spreadsheets.
//!
//! Parses a `xl/worksheets/sheetN.xml` part into [`RawRow`]s in document
//! order. Cell values are resolved against the shared-string table; an
//! out-of-range shared-string index or an unparseable numeric payload
//! degrades to literal text and never aborts the row.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::archive::Archive;
use crate::common::error::{Error, Result};
use crate::ooxml::shared_strings::SharedStringTable;
use crate::sheet::{CellValue, RawCell, RawRow, Table};

/// Which worksheet of a workbook to scan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SheetSelector {
    /// The first worksheet in part order (the common case for price lists).
    #[default]
    First,
    /// Zero-based position in part order.
    Index(usize),
    /// Worksheet whose workbook-declared name matches (case-insensitive).
    Named(String),
}

/// List worksheet parts of an archive, ordered by trailing sheet number.
pub fn worksheet_parts(archive: &Archive) -> Vec<String> {
    let mut parts: Vec<String> = archive
        .entry_names()
        .iter()
        .filter(|name| {
            let lower = name.to_ascii_lowercase();
            lower.starts_with("xl/worksheets/") && lower.ends_with(".xml")
        })
        .cloned()
        .collect();
    parts.sort_by_key(|name| (sheet_number(name).unwrap_or(u32::MAX), name.clone()));
    parts
}

fn sheet_number(part: &str) -> Option<u32> {
    let file = part.rsplit('/').next()?;
    let stem = file.strip_suffix(".xml").or_else(|| file.strip_suffix(".XML"))?;
    let digits: String = stem.chars().filter(char::is_ascii_digit).collect();
    atoi_simd::parse(digits.as_bytes()).ok()
}

/// Resolve a selector to a worksheet part name.
///
/// Name resolution goes through `xl/workbook.xml` and its relationships
/// part; when either is absent or does not mention the sheet, the numeric
/// part order is the fallback.
pub fn locate_worksheet(archive: &mut Archive, selector: &SheetSelector) -> Result<String> {
    let parts = worksheet_parts(archive);
    if parts.is_empty() {
        return Err(Error::Format("archive has no worksheet parts".to_string()));
    }

    match selector {
        SheetSelector::First => Ok(parts[0].clone()),
        SheetSelector::Index(i) => parts
            .get(*i)
            .cloned()
            .ok_or_else(|| Error::Format(format!("no worksheet at index {i}"))),
        SheetSelector::Named(wanted) => {
            let sheets = workbook_sheets(archive).unwrap_or_default();
            let rels = workbook_relationships(archive).unwrap_or_default();
            for (position, sheet) in sheets.iter().enumerate() {
                if !sheet.name.eq_ignore_ascii_case(wanted) {
                    continue;
                }
                if let Some(rel_id) = &sheet.rel_id
                    && let Some(target) = rels.iter().find(|(id, _)| id == rel_id)
                    && let Some(actual) = archive.find_ignore_case(&normalize_target(&target.1))
                {
                    return Ok(actual.to_string());
                }
                if let Some(sheet_id) = sheet.sheet_id {
                    let candidate = format!("xl/worksheets/sheet{sheet_id}.xml");
                    if let Some(actual) = archive.find_ignore_case(&candidate) {
                        return Ok(actual.to_string());
                    }
                }
                if let Some(part) = parts.get(position) {
                    return Ok(part.clone());
                }
            }
            Err(Error::Format(format!("no worksheet named '{wanted}'")))
        },
    }
}

/// Scan the selected worksheet into rows.
pub fn scan(
    archive: &mut Archive,
    selector: &SheetSelector,
    strings: &SharedStringTable,
) -> Result<Table> {
    let part = locate_worksheet(archive, selector)?;
    log::debug!("scanning worksheet part {part}");
    let xml = archive.read(&part)?;
    parse_worksheet(&xml, strings)
}

struct SheetEntry {
    name: String,
    sheet_id: Option<u32>,
    rel_id: Option<String>,
}

fn workbook_sheets(archive: &mut Archive) -> Result<Vec<SheetEntry>> {
    let xml = archive.read_ignore_case("xl/workbook.xml")?;
    let mut reader = Reader::from_reader(xml.as_slice());
    reader.config_mut().trim_text(true);

    let mut sheets = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"sheet" =>
            {
                let mut name = String::new();
                let mut sheet_id = None;
                let mut rel_id = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.local_name().as_ref() {
                        b"name" => name = attr.unescape_value()?.to_string(),
                        b"sheetId" => {
                            sheet_id = atoi_simd::parse(attr.value.as_ref()).ok();
                        },
                        b"id" => rel_id = Some(attr.unescape_value()?.to_string()),
                        _ => {},
                    }
                }
                sheets.push(SheetEntry {
                    name,
                    sheet_id,
                    rel_id,
                });
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Format(format!("workbook parse error: {e}"))),
            _ => {},
        }
        buf.clear();
    }
    Ok(sheets)
}

fn workbook_relationships(archive: &mut Archive) -> Result<Vec<(String, String)>> {
    let xml = archive.read_ignore_case("xl/_rels/workbook.xml.rels")?;
    let mut reader = Reader::from_reader(xml.as_slice());
    reader.config_mut().trim_text(true);

    let mut rels = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.local_name().as_ref() {
                        b"Id" => id = Some(attr.unescape_value()?.to_string()),
                        b"Target" => target = Some(attr.unescape_value()?.to_string()),
                        _ => {},
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    rels.push((id, target));
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Format(format!("relationships parse error: {e}"))),
            _ => {},
        }
        buf.clear();
    }
    Ok(rels)
}

fn normalize_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else if target.starts_with("xl/") {
        target.to_string()
    } else if let Some(relative) = target.strip_prefix("../") {
        format!("xl/{relative}")
    } else {
        format!("xl/{target}")
    }
}

/// Parse one worksheet XML payload into rows.
pub fn parse_worksheet(xml: &[u8], strings: &SharedStringTable) -> Result<Table> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut rows: Table = Vec::new();
    let mut buf = Vec::new();

    let mut current_row: Option<RawRow> = None;
    let mut last_row_index = 0u32;
    let mut last_column = 0u32;

    let mut cell_column = 0u32;
    let mut cell_type: Option<String> = None;
    let mut value_buf = String::new();
    let mut inline_buf = String::new();
    let mut in_value = false;
    let mut in_inline = false;
    let mut in_inline_text = false;
    let mut in_cell = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"row" => {
                    let index = row_index_attr(e)?.unwrap_or(last_row_index + 1);
                    last_row_index = index;
                    last_column = 0;
                    current_row = Some(RawRow::new(index));
                },
                b"c" if current_row.is_some() => {
                    in_cell = true;
                    cell_column = cell_column_attr(e)?.unwrap_or(last_column + 1);
                    last_column = cell_column;
                    cell_type = cell_type_attr(e)?;
                    value_buf.clear();
                    inline_buf.clear();
                    in_value = false;
                    in_inline = false;
                    in_inline_text = false;
                },
                b"v" if in_cell => in_value = true,
                b"is" if in_cell => in_inline = true,
                b"t" if in_inline => in_inline_text = true,
                _ => {},
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                // A self-closed <c/> carries no value.
                b"c" if current_row.is_some() => {
                    let column = cell_column_attr(e)?.unwrap_or(last_column + 1);
                    last_column = column;
                    if let Some(row) = current_row.as_mut() {
                        row.push(RawCell::new(row.index, column, CellValue::Empty));
                    }
                },
                b"row" => {
                    let index = row_index_attr(e)?.unwrap_or(last_row_index + 1);
                    last_row_index = index;
                    rows.push(RawRow::new(index));
                },
                _ => {},
            },
            Ok(Event::Text(ref t)) if in_value || in_inline_text => {
                let text = t
                    .unescape()
                    .map_err(|e| Error::Format(format!("worksheet text: {e}")))?;
                if in_value {
                    value_buf.push_str(&text);
                } else {
                    inline_buf.push_str(&text);
                }
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"v" => in_value = false,
                b"t" if in_inline => in_inline_text = false,
                b"is" => in_inline = false,
                b"c" if in_cell => {
                    in_cell = false;
                    let value = resolve_cell_value(
                        cell_type.as_deref(),
                        &value_buf,
                        &inline_buf,
                        strings,
                    );
                    if let Some(row) = current_row.as_mut() {
                        row.push(RawCell::new(row.index, cell_column, value));
                    }
                    cell_type = None;
                },
                b"row" => {
                    if let Some(row) = current_row.take() {
                        rows.push(row);
                    }
                },
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Format(format!("worksheet parse error: {e}"))),
            _ => {},
        }
        buf.clear();
    }

    Ok(rows)
}

fn row_index_attr(e: &BytesStart<'_>) -> Result<Option<u32>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == b"r" {
            return Ok(atoi_simd::parse(attr.value.as_ref()).ok());
        }
    }
    Ok(None)
}

fn cell_column_attr(e: &BytesStart<'_>) -> Result<Option<u32>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == b"r" {
            let reference = attr.unescape_value()?;
            return Ok(reference_to_coords(&reference).ok().map(|(col, _)| col));
        }
    }
    Ok(None)
}

fn cell_type_attr(e: &BytesStart<'_>) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == b"t" {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

fn resolve_cell_value(
    cell_type: Option<&str>,
    value: &str,
    inline: &str,
    strings: &SharedStringTable,
) -> CellValue {
    match cell_type {
        Some("s") => CellValue::Text(strings.resolve(value)),
        Some("str") | Some("inlineStr") => {
            let text = if value.is_empty() { inline } else { value };
            CellValue::Text(text.to_string())
        },
        Some("b") => match value.trim() {
            "1" => CellValue::Text("TRUE".to_string()),
            "0" => CellValue::Text("FALSE".to_string()),
            other => CellValue::Text(other.to_string()),
        },
        _ => {
            let raw = if value.is_empty() { inline } else { value };
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                CellValue::Empty
            } else if let Ok(number) = fast_float2::parse::<f64, _>(trimmed) {
                CellValue::Number(number)
            } else {
                CellValue::Text(raw.to_string())
            }
        },
    }
}

/// Convert an A1-style reference to 1-based (column, row) coordinates.
pub fn reference_to_coords(reference: &str) -> Result<(u32, u32)> {
    let bytes = reference.as_bytes();
    let mut letters_end = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        if byte.is_ascii_digit() {
            letters_end = i;
            break;
        }
    }
    if letters_end == 0 {
        return Err(Error::Format(format!("invalid cell reference: {reference}")));
    }

    let mut column = 0u32;
    for &byte in &bytes[..letters_end] {
        if !byte.is_ascii_alphabetic() {
            return Err(Error::Format(format!(
                "invalid column in reference: {reference}"
            )));
        }
        column = column * 26 + u32::from(byte.to_ascii_uppercase() - b'A' + 1);
    }

    let row = atoi_simd::parse(&bytes[letters_end..])
        .map_err(|_| Error::Format(format!("invalid row in reference: {reference}")))?;

    Ok((column, row))
}
