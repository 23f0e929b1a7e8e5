//! Unified error types for the ingestion engine.
//!
//! The taxonomy separates container-level failures (`Format`), absent
//! optional parts (`EntryNotFound`), row-scoped field failures
//! (`FieldParse`, degraded to defaults at call sites and never propagated
//! past the row) and exhaustion of the fallback conversion chain
//! (`Conversion`, which carries every attempted strategy in order).
use thiserror::Error;

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// One failed attempt in the fallback conversion chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyFailure {
    /// Name of the strategy that was tried.
    pub strategy: &'static str,
    /// Stringified cause, kept so the aggregate error stays `Send + Sync`.
    pub error: String,
}

impl std::fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.strategy, self.error)
    }
}

/// Main error type for ingestion operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Container or a required XML part is unreadable or malformed
    #[error("Invalid format: {0}")]
    Format(String),

    /// A named archive entry is absent
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// A single field on a single row failed conversion
    #[error("Field '{field}' failed to parse: {reason}")]
    FieldParse {
        field: &'static str,
        reason: String,
    },

    /// Input format is not handled by any strategy chain
    #[error("Unsupported input format: {0}")]
    Unsupported(String),

    /// Every strategy in the fallback chain failed; attempts are listed in
    /// the order they were tried, last one being the proximate cause.
    #[error("Conversion of {input} failed after {} strategies: {}", .attempts.len(), format_attempts(.attempts))]
    Conversion {
        input: String,
        attempts: Vec<StrategyFailure>,
    },
}

impl Error {
    /// The proximate cause of a chain exhaustion, if this is one.
    pub fn last_attempt(&self) -> Option<&StrategyFailure> {
        match self {
            Error::Conversion { attempts, .. } => attempts.last(),
            _ => None,
        }
    }
}

fn format_attempts(attempts: &[StrategyFailure]) -> String {
    let parts: Vec<String> = attempts.iter().map(|a| a.to_string()).collect();
    parts.join("; ")
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::FileNotFound => {
                Error::EntryNotFound("archive entry".to_string())
            },
            zip::result::ZipError::Io(io) => Error::Io(io),
            other => Error::Format(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_error_lists_attempts_in_order() {
        let err = Error::Conversion {
            input: "price.xlsx".to_string(),
            attempts: vec![
                StrategyFailure {
                    strategy: "calamine-auto",
                    error: "not a workbook".to_string(),
                },
                StrategyFailure {
                    strategy: "raw-archive",
                    error: "bad central directory".to_string(),
                },
            ],
        };
        let text = err.to_string();
        let first = text.find("calamine-auto").unwrap();
        let second = text.find("raw-archive").unwrap();
        assert!(first < second);
        assert!(text.contains("2 strategies"));
        assert_eq!(err.last_attempt().unwrap().strategy, "raw-archive");
    }
}
