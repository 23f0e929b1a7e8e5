//! End-to-end pipeline tests over synthetic OOXML archives.
//!
//! Fixtures are built in-memory with the `zip` writer. Some are complete
//! enough for the high-level readers; others deliberately lack workbook
//! metadata so only the raw-archive strategy can rescue them; the
//! records must come out the same either way.

use std::io::{Cursor, Write};

use kalyna::{IngestOptions, Ingestor, Source};
use zip::write::SimpleFileOptions;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn build_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Avto-Apteka-shaped sheet: descriptions in B, hryvnia prices in C,
/// data from row 11. No workbook part, so high-level readers balk and
/// the raw archive scan does the work.
fn apteka_fixture() -> Vec<u8> {
    let shared_strings = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="4" uniqueCount="4">
  <si><t>Акумулятор BOSCH S5 012 60Ah 540A R+ AGM</t></si>
  <si><t>4 350,50 грн</t></si>
  <si><t>Акумулятор MUTLU Asia 75Ah 640A (+/-) GEL</t></si>
  <si><t>Доставка по місту</t></si>
</sst>"#;
    let worksheet = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1"><c r="B1" t="s"><v>3</v></c></row>
    <row r="11">
      <c r="B11" t="s"><v>0</v></c>
      <c r="C11" t="s"><v>1</v></c>
    </row>
    <row r="12">
      <c r="B12" t="s"><v>2</v></c>
      <c r="C12"><v>5120</v></c>
    </row>
    <row r="13">
      <c r="B13" t="s"><v>3</v></c>
      <c r="C13"><v>50</v></c>
    </row>
  </sheetData>
</worksheet>"#;
    build_archive(&[
        ("xl/sharedStrings.xml", shared_strings),
        ("xl/worksheets/sheet1.xml", worksheet),
    ])
}

#[test]
fn full_pipeline_extracts_normalized_records() {
    init_logs();
    let data = apteka_fixture();
    let profile = Source::AvtoApteka.profile();
    let records = Ingestor::new()
        .ingest_bytes(&data, kalyna::InputFormat::Xlsx, &profile)
        .unwrap();

    assert_eq!(records.len(), 2);

    let bosch = &records[0];
    assert_eq!(bosch.brand, "BOSCH");
    assert!(bosch.name.contains("S5 012"));
    assert_eq!(bosch.capacity, Some(60.0));
    assert_eq!(bosch.start_current, Some(540));
    assert_eq!(bosch.price, 4350.50);
    assert_eq!(bosch.polarity, kalyna::Polarity::Right);
    assert_eq!(bosch.chemistry, kalyna::Chemistry::Agm);
    assert_eq!(bosch.region, kalyna::Region::Europe);

    let mutlu = &records[1];
    assert_eq!(mutlu.brand, "MUTLU");
    assert_eq!(mutlu.capacity, Some(75.0));
    assert_eq!(mutlu.polarity, kalyna::Polarity::Left);
    assert_eq!(mutlu.chemistry, kalyna::Chemistry::Gel);
    assert_eq!(mutlu.region, kalyna::Region::Asia);
    assert_eq!(mutlu.price, 5120.0);

    // Row 1 precedes the start row; row 13 has no category prefix.
    assert!(records.iter().all(|r| !r.full_name.contains("Доставка")));
}

#[test]
fn parsing_twice_yields_identical_sequences() {
    let data = apteka_fixture();
    let profile = Source::AvtoApteka.profile();
    let ingestor = Ingestor::new();

    let first = ingestor
        .ingest_bytes(&data, kalyna::InputFormat::Xlsx, &profile)
        .unwrap();
    let second = ingestor
        .ingest_bytes(&data, kalyna::InputFormat::Xlsx, &profile)
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn absent_shared_strings_part_keeps_inline_and_numeric_cells() {
    // No sharedStrings.xml at all: inline strings and numbers still
    // resolve, and the lone shared-string-typed cell degrades to its
    // literal index text.
    let worksheet = r#"<worksheet><sheetData>
      <row r="11">
        <c r="B11" t="inlineStr"><is><t>Акумулятор VARTA Blue 60Ah 540A</t></is></c>
        <c r="C11"><v>4100</v></c>
      </row>
      <row r="12">
        <c r="B12" t="s"><v>17</v></c>
        <c r="C12"><v>999</v></c>
      </row>
    </sheetData></worksheet>"#;
    let data = build_archive(&[("xl/worksheets/sheet1.xml", worksheet)]);

    let profile = Source::AvtoApteka.profile();
    let records = Ingestor::new()
        .ingest_bytes(&data, kalyna::InputFormat::Xlsx, &profile)
        .unwrap();

    // Row 12's cell resolved to "17": no category prefix, so only the
    // inline-string row survives.
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].brand, "VARTA");
    assert_eq!(records[0].price, 4100.0);
}

#[test]
fn csv_destination_receives_the_tabular_form() {
    let data = apteka_fixture();
    let destination = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    let ingestor = Ingestor::with_options(IngestOptions {
        csv_output: Some(destination.path().to_path_buf()),
    });
    let records = ingestor
        .ingest_bytes(&data, kalyna::InputFormat::Xlsx, &Source::AvtoApteka.profile())
        .unwrap();
    assert!(!records.is_empty());

    let written = std::fs::read_to_string(destination.path()).unwrap();
    assert!(written.contains("Акумулятор BOSCH S5 012 60Ah 540A R+ AGM"));
    assert!(written.contains("5120"));
}

#[test]
fn empty_but_valid_sheet_yields_an_empty_record_list() {
    let worksheet = r#"<worksheet><sheetData>
      <row r="1"><c r="A1" t="inlineStr"><is><t>Прайс-лист</t></is></c></row>
    </sheetData></worksheet>"#;
    let data = build_archive(&[("xl/worksheets/sheet1.xml", worksheet)]);

    let records = Ingestor::new()
        .ingest_bytes(&data, kalyna::InputFormat::Xlsx, &Source::AvtoApteka.profile())
        .unwrap();
    assert!(records.is_empty());
}
