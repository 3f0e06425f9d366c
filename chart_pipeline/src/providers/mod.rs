//! Data-source abstraction for raw daily price tables.
//!
//! This module defines the [`DataSource`] trait, the boundary between the
//! chart pipeline and whatever actually fetches market data (a vendor API,
//! files on disk, fixtures in tests). Sources return raw [`RawTable`]s; the
//! pipeline normalizes them.
//!
//! The trait is async and object-safe, so callers can pick a source at runtime
//! behind `&dyn DataSource`.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use chart_pipeline::models::{date_range::DateRange, raw::RawTable};
//! use chart_pipeline::providers::{DataSource, FetchError};
//!
//! struct NothingSource;
//!
//! #[async_trait]
//! impl DataSource for NothingSource {
//!     async fn fetch(&self, _symbol: &str, _range: DateRange) -> Result<RawTable, FetchError> {
//!         Ok(RawTable::empty())
//!     }
//! }
//! ```

pub mod json_file;
pub mod memory;

use std::path::PathBuf;

use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::models::{date_range::DateRange, raw::RawTable};

pub use self::json_file::{JsonDirSource, JsonFileSource};
pub use self::memory::InMemorySource;

/// Fetches the raw table for one symbol and date range.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Returns the rows available for `symbol` within `range`.
    ///
    /// An empty table is a valid answer ("no trading days"); an error means the
    /// source could not answer at all. The pipeline treats both as "no data".
    async fn fetch(&self, symbol: &str, range: DateRange) -> Result<RawTable, FetchError>;
}

/// Errors a [`DataSource`] can report.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum FetchError {
    /// The source has nothing under this symbol.
    #[snafu(display("no data source entry for symbol {symbol}"))]
    NotFound { symbol: String, backtrace: Backtrace },

    /// A temporary failure such as a network timeout.
    #[snafu(display("transient failure fetching {symbol}: {message}"))]
    Transient {
        symbol: String,
        message: String,
        backtrace: Backtrace,
    },

    /// Reading the backing file failed.
    #[snafu(display("failed to read {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The backing file is not a valid raw table.
    #[snafu(display("failed to parse {}: {source}", path.display()))]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
        backtrace: Backtrace,
    },
}

impl FetchError {
    /// Whether retrying later might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    #[async_trait]
    impl DataSource for Offline {
        async fn fetch(&self, symbol: &str, _range: DateRange) -> Result<RawTable, FetchError> {
            TransientSnafu {
                symbol,
                message: "connection reset",
            }
            .fail()
        }
    }

    fn pick(name: &str) -> Box<dyn DataSource> {
        if name == "offline" {
            Box::new(Offline)
        } else {
            Box::new(InMemorySource::new())
        }
    }

    #[tokio::test]
    async fn sources_are_selectable_at_runtime() {
        let range = DateRange::parse("2024-01-01", "2024-01-10").unwrap();

        let err = pick("offline").fetch("AAA", range).await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "transient failure fetching AAA: connection reset");

        let err = pick("memory").fetch("AAA", range).await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
        assert!(!err.is_transient());
    }
}
