//! Shared infrastructure used by every stage of the ingestion pipeline.

pub mod detection;
pub mod error;
pub mod tempcopy;

pub use error::{Error, Result, StrategyFailure};
