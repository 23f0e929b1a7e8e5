//! Fallback conversion chain.
//!
//! For each input format an ordered list of independent strategies is
//! tried, from the most reliable reader down to the raw-archive parse.
//! The chain moves through NotStarted → TryingStrategy(i) → Succeeded /
//! AllFailed: each attempt runs against a fresh temporary copy of the
//! input, a failure is recorded and the next strategy runs, and only
//! exhaustion of the whole list surfaces an error, carrying every
//! recorded failure in attempt order so the final message stays
//! actionable.

use std::path::Path;

use crate::common::detection::{self, Container};
use crate::common::error::{Error, Result, StrategyFailure};
use crate::common::tempcopy::TempCopy;
use crate::ooxml::worksheet::SheetSelector;
use crate::sheet::Table;

pub mod csv_out;
pub mod document;
pub mod spreadsheet;

/// Input formats with a conversion chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Xlsx,
    Xls,
    Docx,
    Doc,
    Pdf,
}

impl InputFormat {
    /// Map a lowercase file extension to a format.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "xlsx" => Some(InputFormat::Xlsx),
            "xls" => Some(InputFormat::Xls),
            "docx" => Some(InputFormat::Docx),
            "doc" => Some(InputFormat::Doc),
            "pdf" => Some(InputFormat::Pdf),
            _ => None,
        }
    }

    /// Canonical extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            InputFormat::Xlsx => "xlsx",
            InputFormat::Xls => "xls",
            InputFormat::Docx => "docx",
            InputFormat::Doc => "doc",
            InputFormat::Pdf => "pdf",
        }
    }

    /// Infer the format of a file from its extension, corrected by the
    /// container signature.
    ///
    /// Suppliers routinely mislabel exports: an `.xls` that is really a
    /// ZIP-based `.xlsx`, a `.docx` that is an OLE2 `.doc`. The
    /// leading bytes win over the name.
    pub fn detect(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let declared = Self::from_extension(&extension)
            .ok_or_else(|| Error::Unsupported(format!(".{extension}")))?;

        let mut header = [0u8; 8];
        let sniffed = match std::fs::File::open(path) {
            Ok(mut file) => {
                use std::io::Read;
                match file.read(&mut header) {
                    Ok(n) => detection::sniff_container(&header[..n]),
                    Err(_) => Container::Unknown,
                }
            },
            Err(_) => Container::Unknown,
        };

        let effective = match (declared, sniffed) {
            (InputFormat::Xls, Container::Zip) => InputFormat::Xlsx,
            (InputFormat::Xlsx, Container::Ole2) => InputFormat::Xls,
            (InputFormat::Doc, Container::Zip) => InputFormat::Docx,
            (InputFormat::Docx, Container::Ole2) => InputFormat::Doc,
            (declared, _) => declared,
        };
        if effective != declared {
            log::warn!(
                "{}: extension says {declared:?} but signature says {effective:?}; trusting the signature",
                path.display()
            );
        }
        Ok(effective)
    }
}

/// One conversion strategy: a self-contained attempt to turn the input
/// file into the tabular intermediate.
pub trait Strategy {
    /// Short name used in logs and in the aggregated failure report.
    fn name(&self) -> &'static str;

    /// Run the strategy against (a temporary copy of) the input file.
    fn convert(&self, input: &Path) -> Result<Table>;
}

/// Ordered strategies for one input format.
pub struct FallbackChain {
    strategies: Vec<Box<dyn Strategy>>,
}

/// A successful chain run: the table, which strategy produced it, and
/// the failures recorded on the way there.
pub struct ChainOutcome {
    pub table: Table,
    pub strategy: &'static str,
    pub failures: Vec<StrategyFailure>,
}

impl FallbackChain {
    /// Build the chain for a format, most reliable strategy first.
    pub fn for_format(format: InputFormat, sheet: &SheetSelector) -> Self {
        let strategies: Vec<Box<dyn Strategy>> = match format {
            InputFormat::Xlsx => vec![
                Box::new(spreadsheet::CalamineAuto::new(sheet.clone())),
                Box::new(spreadsheet::CalamineXlsx::new(sheet.clone())),
                Box::new(spreadsheet::RawArchive::new(sheet.clone())),
            ],
            InputFormat::Xls => vec![
                Box::new(spreadsheet::CalamineAuto::new(sheet.clone())),
                Box::new(spreadsheet::CalamineXls::new(sheet.clone())),
                Box::new(spreadsheet::RawArchive::new(sheet.clone())),
            ],
            InputFormat::Docx => vec![
                Box::new(document::DocxTables),
                Box::new(document::PlainTextLines),
            ],
            InputFormat::Doc => vec![Box::new(document::PlainTextLines)],
            InputFormat::Pdf => vec![Box::new(document::PdfText)],
        };
        Self { strategies }
    }

    /// Strategy names in attempt order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the chain against `source`.
    ///
    /// Each strategy gets a fresh temporary copy; the caller's file is
    /// never handed to a parser directly, and the copies are removed on
    /// every exit path.
    pub fn convert(&self, source: &Path) -> Result<Table> {
        self.convert_with_report(source).map(|outcome| outcome.table)
    }

    /// Like [`convert`](Self::convert), but also reports which strategy
    /// succeeded and every failure recorded before it, in attempt order.
    pub fn convert_with_report(&self, source: &Path) -> Result<ChainOutcome> {
        let mut failures: Vec<StrategyFailure> = Vec::new();

        for strategy in &self.strategies {
            let copy = TempCopy::of(source)?;
            log::info!(
                "converting {} with strategy {}",
                source.display(),
                strategy.name()
            );
            match strategy.convert(copy.path()) {
                Ok(table) => {
                    log::info!(
                        "strategy {} succeeded with {} rows",
                        strategy.name(),
                        table.len()
                    );
                    return Ok(ChainOutcome {
                        table,
                        strategy: strategy.name(),
                        failures,
                    });
                },
                Err(error) => {
                    log::warn!("strategy {} failed: {error}", strategy.name());
                    failures.push(StrategyFailure {
                        strategy: strategy.name(),
                        error: error.to_string(),
                    });
                },
            }
        }

        Err(Error::Conversion {
            input: source.display().to_string(),
            attempts: failures,
        })
    }
}
