//! Direct parsing of OOXML containers.
//!
//! These are the parts the raw-archive conversion strategies drive when
//! the high-level readers have rejected a file: the shared-string table,
//! the worksheet grid, and the WordprocessingML document body. Only the
//! subset needed to recover tabular data is implemented: no styles, no
//! formulas, no round-tripping.

pub mod docx;
pub mod shared_strings;
pub mod worksheet;

pub use shared_strings::SharedStringTable;
pub use worksheet::SheetSelector;
