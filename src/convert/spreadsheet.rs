//! Spreadsheet conversion strategies.
//!
//! Ordered by reliability: calamine's auto-detecting reader, calamine
//! with the format pinned, and finally the raw-archive scan that pulls
//! rows straight out of the OOXML parts. The raw path is what rescues
//! files whose workbook metadata is broken enough that every proper
//! reader refuses them while the worksheet XML itself is intact.

use std::io::{BufReader, Read, Seek};
use std::path::Path;

use calamine::{Data, Reader as CalamineReader, Xls, Xlsx, open_workbook, open_workbook_auto};

use crate::archive::Archive;
use crate::common::error::{Error, Result};
use crate::convert::Strategy;
use crate::ooxml::shared_strings::SharedStringTable;
use crate::ooxml::worksheet::{self, SheetSelector};
use crate::sheet::{CellValue, RawCell, RawRow, Table};

/// calamine with container auto-detection.
pub struct CalamineAuto {
    sheet: SheetSelector,
}

impl CalamineAuto {
    pub fn new(sheet: SheetSelector) -> Self {
        Self { sheet }
    }
}

impl Strategy for CalamineAuto {
    fn name(&self) -> &'static str {
        "calamine-auto"
    }

    fn convert(&self, input: &Path) -> Result<Table> {
        let mut workbook = open_workbook_auto(input)
            .map_err(|e| Error::Format(format!("workbook open failed: {e}")))?;
        read_table(&mut workbook, &self.sheet)
    }
}

/// calamine pinned to the OOXML reader.
pub struct CalamineXlsx {
    sheet: SheetSelector,
}

impl CalamineXlsx {
    pub fn new(sheet: SheetSelector) -> Self {
        Self { sheet }
    }
}

impl Strategy for CalamineXlsx {
    fn name(&self) -> &'static str {
        "calamine-xlsx"
    }

    fn convert(&self, input: &Path) -> Result<Table> {
        let mut workbook: Xlsx<BufReader<std::fs::File>> = open_workbook(input)
            .map_err(|e| Error::Format(format!("xlsx open failed: {e}")))?;
        read_table(&mut workbook, &self.sheet)
    }
}

/// calamine pinned to the legacy binary reader.
pub struct CalamineXls {
    sheet: SheetSelector,
}

impl CalamineXls {
    pub fn new(sheet: SheetSelector) -> Self {
        Self { sheet }
    }
}

impl Strategy for CalamineXls {
    fn name(&self) -> &'static str {
        "calamine-xls"
    }

    fn convert(&self, input: &Path) -> Result<Table> {
        let mut workbook: Xls<BufReader<std::fs::File>> = open_workbook(input)
            .map_err(|e| Error::Format(format!("xls open failed: {e}")))?;
        read_table(&mut workbook, &self.sheet)
    }
}

/// Last resort: open the file as a ZIP container and scan the worksheet
/// XML directly.
pub struct RawArchive {
    sheet: SheetSelector,
}

impl RawArchive {
    pub fn new(sheet: SheetSelector) -> Self {
        Self { sheet }
    }
}

impl Strategy for RawArchive {
    fn name(&self) -> &'static str {
        "raw-archive"
    }

    fn convert(&self, input: &Path) -> Result<Table> {
        let mut archive = Archive::open(input)?;
        let strings = SharedStringTable::from_archive(&mut archive)?;
        worksheet::scan(&mut archive, &self.sheet, &strings)
    }
}

fn read_table<RS, R>(workbook: &mut R, sheet: &SheetSelector) -> Result<Table>
where
    RS: Read + Seek,
    R: CalamineReader<RS>,
    R::Error: std::fmt::Display,
{
    let range = match sheet {
        SheetSelector::First => worksheet_at(workbook, 0)?,
        SheetSelector::Index(i) => worksheet_at(workbook, *i)?,
        SheetSelector::Named(wanted) => {
            let names = workbook.sheet_names().to_owned();
            let actual = names
                .iter()
                .find(|name| name.eq_ignore_ascii_case(wanted))
                .ok_or_else(|| Error::Format(format!("no worksheet named '{wanted}'")))?
                .clone();
            workbook
                .worksheet_range(&actual)
                .map_err(|e| Error::Format(format!("worksheet '{actual}' read failed: {e}")))?
        },
    };

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut table = Table::with_capacity(range.height());
    for (i, cells) in range.rows().enumerate() {
        let index = start_row + i as u32 + 1;
        let mut row = RawRow::new(index);
        for (j, data) in cells.iter().enumerate() {
            let column = start_col + j as u32 + 1;
            row.push(RawCell::new(index, column, convert_data(data)));
        }
        table.push(row);
    }
    Ok(table)
}

fn worksheet_at<RS, R>(workbook: &mut R, index: usize) -> Result<calamine::Range<Data>>
where
    RS: Read + Seek,
    R: CalamineReader<RS>,
    R::Error: std::fmt::Display,
{
    workbook
        .worksheet_range_at(index)
        .ok_or_else(|| Error::Format(format!("workbook has no worksheet at index {index}")))?
        .map_err(|e| Error::Format(format!("worksheet read failed: {e}")))
}

fn convert_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        // Formula error markers carry no usable value.
        Data::Error(_) => CellValue::Empty,
    }
}
