//! Container signature sniffing.
//!
//! Price lists arrive with unreliable extensions: suppliers export
//! legacy-named `.xls` files that are really ZIP-based OOXML, and vice
//! versa. Strategy chains are therefore chosen from the leading bytes of
//! the file, not the extension alone.

/// ZIP local file header magic.
const ZIP_LOCAL_MAGIC: &[u8; 4] = b"PK\x03\x04";
/// ZIP end-of-central-directory magic (empty archives start with this).
const ZIP_EOCD_MAGIC: &[u8; 4] = b"PK\x05\x06";
/// ZIP spanned-archive marker.
const ZIP_SPAN_MAGIC: &[u8; 4] = b"PK\x07\x08";
/// OLE2 compound file magic, used by legacy .doc/.xls.
const OLE2_MAGIC: &[u8; 8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Physical container kind detected from leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// ZIP archive (OOXML family)
    Zip,
    /// OLE2 compound file (legacy Office binary formats)
    Ole2,
    /// Neither signature present
    Unknown,
}

/// Sniff the container kind from the first bytes of a file.
pub fn sniff_container(data: &[u8]) -> Container {
    if data.starts_with(ZIP_LOCAL_MAGIC)
        || data.starts_with(ZIP_EOCD_MAGIC)
        || data.starts_with(ZIP_SPAN_MAGIC)
    {
        return Container::Zip;
    }
    if data.len() >= OLE2_MAGIC.len() && &data[..OLE2_MAGIC.len()] == OLE2_MAGIC {
        return Container::Ole2;
    }
    Container::Unknown
}

/// Check that a ZIP payload carries an end-of-central-directory record.
///
/// The EOCD sits near the end of the archive (after an optional comment),
/// so the scan runs backwards from the tail. A truncated download passes
/// the leading-magic check but fails here.
pub fn has_central_directory(data: &[u8]) -> bool {
    memchr::memmem::rfind(data, ZIP_EOCD_MAGIC).is_some()
}
