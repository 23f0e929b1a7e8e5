//! Parse entry points.
//!
//! [`Ingestor`] owns the configuration for a batch of parses (there is
//! no process-wide state) and drives the pipeline: detect the format,
//! run the fallback conversion chain, optionally persist the tabular
//! form, then walk the rows with the profile's section tracking and emit
//! normalized records.
//!
//! One document is parsed strictly sequentially because section headings
//! are inherited downward; independent documents can be parsed from as
//! many threads as desired, since every parse owns its own state.

use std::path::{Path, PathBuf};

use crate::common::error::Result;
use crate::common::tempcopy::TempCopy;
use crate::convert::{FallbackChain, InputFormat, csv_out};
use crate::extract::record::{NormalizedRecord, emit_record};
use crate::profile::{ExtractionProfile, SectionContext};
use crate::sheet::{RawRow, Table};

/// Caller-owned configuration for an [`Ingestor`].
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// When set, the converted tabular form is written here as CSV
    /// before extraction runs.
    pub csv_output: Option<PathBuf>,
}

/// The ingestion engine façade.
#[derive(Debug, Default)]
pub struct Ingestor {
    options: IngestOptions,
}

impl Ingestor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: IngestOptions) -> Self {
        Self { options }
    }

    /// Ingest a file: convert, then extract records under `profile`.
    pub fn ingest_path(
        &self,
        path: &Path,
        profile: &ExtractionProfile,
    ) -> Result<Vec<NormalizedRecord>> {
        log::info!("ingesting {} as source '{}'", path.display(), profile.name);
        let format = InputFormat::detect(path)?;
        let table = self.convert(path, format, profile)?;
        Ok(extract_records(&table, profile))
    }

    /// Ingest an in-memory payload of a known format.
    pub fn ingest_bytes(
        &self,
        data: &[u8],
        format: InputFormat,
        profile: &ExtractionProfile,
    ) -> Result<Vec<NormalizedRecord>> {
        let copy = TempCopy::from_bytes(data, format.extension())?;
        let table = self.convert(copy.path(), format, profile)?;
        Ok(extract_records(&table, profile))
    }

    /// Run only the conversion chain, returning the tabular form.
    pub fn convert_to_table(&self, path: &Path, profile: &ExtractionProfile) -> Result<Table> {
        let format = InputFormat::detect(path)?;
        self.convert(path, format, profile)
    }

    fn convert(
        &self,
        path: &Path,
        format: InputFormat,
        profile: &ExtractionProfile,
    ) -> Result<Table> {
        let chain = FallbackChain::for_format(format, &profile.sheet);
        let table = chain.convert(path)?;
        if let Some(destination) = &self.options.csv_output {
            csv_out::write_table(destination, &table)?;
        }
        Ok(table)
    }
}

/// Walk converted rows in document order and emit normalized records.
///
/// Section headings update the scan-local context and are consumed;
/// section-end markers stop extraction for the rest of the document.
/// Order of the output equals document row order minus skipped rows, so
/// parsing the same document twice yields identical sequences.
pub fn extract_records(table: &[RawRow], profile: &ExtractionProfile) -> Vec<NormalizedRecord> {
    let mut context = SectionContext::new();
    let mut records = Vec::new();

    for row in table {
        if row.index < profile.start_row {
            continue;
        }
        if context.is_ended() {
            continue;
        }
        if let Some(section) = &profile.section {
            if section.is_end_marker(row) {
                log::debug!("row {}: section end marker", row.index);
                context.end();
                continue;
            }
            if let Some(label) = section.match_header(row, &profile.columns) {
                context.set_label(label);
                continue;
            }
        }
        if let Some(record) = emit_record(row, &context, profile) {
            records.push(record);
        }
    }

    log::info!(
        "extracted {} records from {} rows for source '{}'",
        records.len(),
        table.len(),
        profile.name
    );
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::record::{Chemistry, Region};
    use crate::profile::sources::Source;
    use crate::sheet::{CellValue, RawCell};

    fn amega_row(index: u32, model: &str, capacity: f64, price: f64) -> RawRow {
        let mut row = RawRow::new(index);
        row.push(RawCell::new(index, 1, CellValue::Number(index as f64)));
        row.push(RawCell::new(index, 2, CellValue::Text(model.to_string())));
        row.push(RawCell::new(index, 4, CellValue::Number(capacity)));
        row.push(RawCell::new(index, 6, CellValue::Number(price)));
        row
    }

    fn heading_row(index: u32, label: &str) -> RawRow {
        let mut row = RawRow::new(index);
        row.push(RawCell::new(index, 2, CellValue::Text(label.to_string())));
        row
    }

    #[test]
    fn section_inheritance_spans_data_rows_until_redefined() {
        let profile = Source::AMegaAuto.profile();
        let table = vec![
            heading_row(8, "AGM BATTERIES ASIA"),
            amega_row(9, "6CT60 VL", 60.0, 2980.0),
            amega_row(10, "6CT75 VL", 75.0, 3480.0),
            heading_row(11, "EFB BATTERIES"),
            amega_row(12, "6CT60 EF", 60.0, 3110.0),
        ];
        let records = extract_records(&table, &profile);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].chemistry, Chemistry::Agm);
        assert_eq!(records[0].region, Region::Asia);
        assert_eq!(records[1].chemistry, Chemistry::Agm);
        assert_eq!(records[1].region, Region::Asia);
        assert_eq!(records[2].chemistry, Chemistry::Efb);
        assert_eq!(records[2].region, Region::Europe);
    }

    #[test]
    fn rows_before_start_row_are_ignored() {
        let profile = Source::AMegaAuto.profile();
        let table = vec![
            heading_row(2, "AGM BATTERIES"),
            amega_row(3, "6CT60 VL", 60.0, 2980.0),
            amega_row(9, "6CT75 VL", 75.0, 3480.0),
        ];
        let records = extract_records(&table, &profile);
        // Rows 2 and 3 precede start_row 8; only row 9 qualifies, and the
        // early heading never entered the context.
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].chemistry, Chemistry::Lab);
    }

    #[test]
    fn end_marker_stops_extraction() {
        let profile = Source::FopRuslan.profile();
        let mut product = RawRow::new(8);
        product.push(RawCell::new(8, 2, CellValue::Text("ISTA 6CT-77 77Ah".to_string())));
        product.push(RawCell::new(8, 4, CellValue::Number(3210.0)));

        let mut marker = RawRow::new(9);
        marker.push(RawCell::new(
            9,
            2,
            CellValue::Text("02. Автономні джерела живлення".to_string()),
        ));

        let mut generator = RawRow::new(10);
        generator.push(RawCell::new(10, 2, CellValue::Text("Генератор X 2000".to_string())));
        generator.push(RawCell::new(10, 4, CellValue::Number(15000.0)));

        let records = extract_records(&[product, marker, generator], &profile);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].brand, "ISTA");
    }

    #[test]
    fn same_table_extracts_identically_twice() {
        let profile = Source::AMegaAuto.profile();
        let table = vec![
            heading_row(8, "GEL BATTERIES L+"),
            amega_row(9, "6CT60 GL", 60.0, 2980.0),
        ];
        let first = extract_records(&table, &profile);
        let second = extract_records(&table, &profile);
        assert_eq!(first, second);
    }
}
