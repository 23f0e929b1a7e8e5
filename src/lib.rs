//! Kalyna - a price-list ingestion engine
//!
//! Kalyna turns supplier price-list documents of unknown, possibly
//! malformed internal structure (OOXML and legacy spreadsheets, Word
//! documents, PDFs) into normalized battery/solar product records.
//!
//! # Features
//!
//! - **Fallback conversion chain**: high-level readers first, a direct
//!   OOXML archive scan last, so a broken workbook part does not sink an
//!   otherwise readable file
//! - **Raw OOXML access**: shared-string resolution and worksheet
//!   scanning straight from the ZIP container
//! - **Declarative extraction profiles**: per-supplier layouts (start
//!   row, columns, section headings) as data, not code
//! - **Heuristic field extraction**: capacity, start current, polarity,
//!   chemistry and region from mixed Ukrainian/English descriptions,
//!   with explicit defaults
//!
//! # Example - Ingesting a supplier price list
//!
//! ```no_run
//! use kalyna::{Ingestor, Source};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let profile = Source::AvtoApteka.profile();
//! let records = Ingestor::new().ingest_path("pricelist.xlsx".as_ref(), &profile)?;
//!
//! for record in &records {
//!     println!("{}: {} UAH", record.full_name, record.price);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Keeping the converted CSV
//!
//! ```no_run
//! use kalyna::{IngestOptions, Ingestor, Source};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ingestor = Ingestor::with_options(IngestOptions {
//!     csv_output: Some("pricelist.csv".into()),
//! });
//! let records = ingestor.ingest_path(
//!     "pricelist.xls".as_ref(),
//!     &Source::FopRuslan.profile(),
//! )?;
//! println!("{} records", records.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Custom profile for a new supplier
//!
//! ```
//! use kalyna::profile::ExtractionProfile;
//! use kalyna::{extract_records, CellValue, RawCell, RawRow};
//!
//! let mut profile = ExtractionProfile::generic("Demo supplier");
//! profile.columns.description = 2;
//! profile.columns.price = Some(3);
//!
//! let mut row = RawRow::new(1);
//! row.push(RawCell::new(1, 2, CellValue::Text("Акумулятор BOSCH S4 60Ah".into())));
//! row.push(RawCell::new(1, 3, CellValue::Text("4 200,00 грн".into())));
//!
//! let records = extract_records(&[row], &profile);
//! assert_eq!(records[0].brand, "BOSCH");
//! assert_eq!(records[0].price, 4200.0);
//! ```

/// Read-only ZIP container access for OOXML inputs
pub mod archive;

/// Errors, container detection, temp-file duplication
pub mod common;

/// The fallback conversion chain and its strategies
pub mod convert;

/// Heuristic field extraction and the normalized record emitter
pub mod extract;

/// Parse entry points
pub mod ingest;

/// Direct parsers for OOXML parts (shared strings, worksheets, DOCX body)
pub mod ooxml;

/// Declarative per-source extraction profiles
pub mod profile;

/// The tabular intermediate shared by all strategies
pub mod sheet;

// Re-export the surface most callers need.
pub use common::error::{Error, Result, StrategyFailure};
pub use convert::{ChainOutcome, FallbackChain, InputFormat, Strategy};
pub use extract::record::{Chemistry, NormalizedRecord, Polarity, Region};
pub use ingest::{IngestOptions, Ingestor, extract_records};
pub use ooxml::{SharedStringTable, SheetSelector};
pub use profile::sources::Source;
pub use profile::{ExtractionProfile, FieldRules, SectionContext};
pub use sheet::{CellValue, RawCell, RawRow, Table};
