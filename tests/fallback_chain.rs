//! Fallback ordering across conversion strategies.

use std::io::{Cursor, Write};

use kalyna::convert::FallbackChain;
use kalyna::{Error, InputFormat, SheetSelector};
use zip::write::SimpleFileOptions;

fn write_fixture(extension: &str, data: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{extension}"))
        .tempfile()
        .unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}

/// A ZIP that is a perfectly fine archive but not a workbook calamine
/// accepts: no workbook.xml, no content types, just a worksheet part.
fn headless_worksheet_zip() -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer
        .start_file("xl/worksheets/sheet1.xml", options)
        .unwrap();
    writer
        .write_all(
            br#"<worksheet><sheetData>
              <row r="1"><c r="A1" t="inlineStr"><is><t>survivor</t></is></c></row>
            </sheetData></worksheet>"#,
        )
        .unwrap();
    writer.finish().unwrap().into_inner()
}

#[test]
fn third_strategy_rescues_after_two_recorded_failures() {
    let _ = env_logger::builder().is_test(true).try_init();
    let file = write_fixture("xlsx", &headless_worksheet_zip());
    let chain = FallbackChain::for_format(InputFormat::Xlsx, &SheetSelector::First);

    let outcome = chain.convert_with_report(file.path()).unwrap();
    assert_eq!(outcome.strategy, "raw-archive");
    assert_eq!(outcome.failures.len(), 2);
    assert_eq!(outcome.failures[0].strategy, "calamine-auto");
    assert_eq!(outcome.failures[1].strategy, "calamine-xlsx");
    assert_eq!(outcome.table.len(), 1);
    assert_eq!(outcome.table[0].text(1), Some("survivor"));
}

#[test]
fn exhausted_chain_reports_every_attempt_in_order() {
    // Leading ZIP magic but no central directory: every strategy fails.
    let file = write_fixture("xlsx", b"PK\x03\x04 nothing else of a zip");
    let chain = FallbackChain::for_format(InputFormat::Xlsx, &SheetSelector::First);

    match chain.convert(file.path()) {
        Err(Error::Conversion { attempts, .. }) => {
            let order: Vec<&str> = attempts.iter().map(|a| a.strategy).collect();
            assert_eq!(order, vec!["calamine-auto", "calamine-xlsx", "raw-archive"]);
        },
        other => panic!("expected Conversion error, got {:?}", other.map(|t| t.len())),
    }
}

#[test]
fn original_file_is_never_consumed_by_the_chain() {
    let payload = headless_worksheet_zip();
    let file = write_fixture("xlsx", &payload);
    let chain = FallbackChain::for_format(InputFormat::Xlsx, &SheetSelector::First);
    chain.convert(file.path()).unwrap();

    // Strategies only ever saw temporary copies.
    assert_eq!(std::fs::read(file.path()).unwrap(), payload);
}
