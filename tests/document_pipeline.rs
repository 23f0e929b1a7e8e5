//! Document-format inputs: DOCX tables and legacy .doc text lines.

use std::io::{Cursor, Write};

use kalyna::profile::ExtractionProfile;
use kalyna::{InputFormat, Ingestor, Source};
use zip::write::SimpleFileOptions;

fn docx_fixture() -> Vec<u8> {
    let document = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:tbl>
      <w:tr>
        <w:tc><w:p><w:r><w:t>Акумулятор TOPLA Energy 66Ah 620A R+</w:t></w:r></w:p></w:tc>
        <w:tc><w:p><w:r><w:t>3 870,00 грн</w:t></w:r></w:p></w:tc>
      </w:tr>
      <w:tr>
        <w:tc><w:p><w:r><w:t>Разом позицій: 1</w:t></w:r></w:p></w:tc>
        <w:tc><w:p><w:r><w:t></w:t></w:r></w:p></w:tc>
      </w:tr>
    </w:tbl>
  </w:body>
</w:document>"#;
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

#[test]
fn docx_table_rows_reach_the_extractor() {
    let mut profile = ExtractionProfile::generic("Demo docx supplier");
    profile.columns.description = 1;
    profile.columns.price = Some(2);

    let records = Ingestor::new()
        .ingest_bytes(&docx_fixture(), InputFormat::Docx, &profile)
        .unwrap();

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.brand, "TOPLA");
    assert_eq!(record.capacity, Some(66.0));
    assert_eq!(record.start_current, Some(620));
    assert_eq!(record.price, 3870.0);
}

#[test]
fn legacy_doc_lines_with_brand_headings() {
    let content = "\
ТОВ Авто Альянс, гуртовий прайс\n\
VARTA\n\
6CT-60 540А 2770 2850 2900\n\
6CT-74 680А 3340 3420 3495\n\
MUTLU\n\
6CT-55 450А 2610 2680 2740\n";

    let records = Ingestor::new()
        .ingest_bytes(content.as_bytes(), InputFormat::Doc, &Source::AvtoAlians.profile())
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].brand, "VARTA");
    assert_eq!(records[0].name, "6CT-60");
    assert_eq!(records[0].full_name, "VARTA 6CT-60");
    assert_eq!(records[0].price, 2770.0);
    assert_eq!(records[1].brand, "VARTA");
    assert_eq!(records[1].price, 3340.0);
    // The MUTLU heading redefines the section for the last line.
    assert_eq!(records[2].brand, "MUTLU");
    assert_eq!(records[2].price, 2610.0);
}
