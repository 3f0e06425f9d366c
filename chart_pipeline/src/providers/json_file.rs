//! File-backed sources reading [`RawTable`] JSON documents.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::{date_range::DateRange, raw::RawTable},
    providers::{DataSource, FetchError, IoSnafu, NotFoundSnafu, ParseSnafu},
};

async fn read_table(path: &Path) -> Result<RawTable, FetchError> {
    let bytes = tokio::fs::read(path).await.context(IoSnafu { path })?;
    serde_json::from_slice(&bytes).context(ParseSnafu { path })
}

/// One file per symbol: `<dir>/<SYMBOL>.json`.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.json", symbol.trim().to_uppercase()))
    }
}

#[async_trait]
impl DataSource for JsonDirSource {
    async fn fetch(&self, symbol: &str, range: DateRange) -> Result<RawTable, FetchError> {
        let symbol = symbol.trim();
        // Path separators would escape the directory.
        if symbol.is_empty() || symbol.contains(['/', '\\']) || symbol.starts_with('.') {
            return NotFoundSnafu { symbol }.fail();
        }
        let path = self.path_for(symbol);
        if !tokio::fs::try_exists(&path).await.context(IoSnafu { path: &path })? {
            return NotFoundSnafu { symbol }.fail();
        }
        debug!(symbol, %range, path = %path.display(), "reading symbol file");
        read_table(&path).await
    }
}

/// A single batched file with compound `(field, symbol)` columns, serving every symbol in it.
///
/// A symbol absent from the header is [`FetchError::NotFound`]. A flat header
/// names no symbol at all, so it serves nothing.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for JsonFileSource {
    async fn fetch(&self, symbol: &str, range: DateRange) -> Result<RawTable, FetchError> {
        debug!(symbol, %range, path = %self.path.display(), "reading batch file");
        let table = read_table(&self.path).await?;
        let wanted = symbol.trim();
        if !table.symbols().iter().any(|s| s.trim().eq_ignore_ascii_case(wanted)) {
            debug!(symbol, symbols = ?table.symbols(), "symbol not in batch header");
            return NotFoundSnafu { symbol }.fail();
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::models::raw::ColumnKey;

    const FLAT: &str = r#"{
        "columns": ["Open", "High", "Low", "Close"],
        "rows": [{ "date": "2024-01-02", "values": [1.0, 2.0, 0.5, 1.5] }]
    }"#;

    fn range() -> DateRange {
        DateRange::parse("2024-01-01", "2024-02-01").unwrap()
    }

    #[tokio::test]
    async fn dir_source_reads_symbol_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("AAA.json"), FLAT).unwrap();
        let source = JsonDirSource::new(dir.path());

        let table = source.fetch("aaa", range()).await.unwrap();
        assert_eq!(table.columns()[3], ColumnKey::simple("Close"));
        assert_eq!(table.rows().len(), 1);
    }

    #[tokio::test]
    async fn dir_source_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let source = JsonDirSource::new(dir.path());
        assert!(matches!(
            source.fetch("NOPE", range()).await,
            Err(FetchError::NotFound { .. })
        ));
        assert!(matches!(
            source.fetch("../etc/passwd", range()).await,
            Err(FetchError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn dir_source_reports_bad_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("BAD.json"), "{ not json").unwrap();
        let err = JsonDirSource::new(dir.path()).fetch("BAD", range()).await.unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
        assert!(err.to_string().contains("BAD.json"));
    }

    #[tokio::test]
    async fn batch_file_serves_every_symbol() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("batch.json");
        fs::write(
            &path,
            r#"{
                "columns": [["Close", "AAA"], ["Close", "BBB"]],
                "rows": [{ "date": "2024-01-02", "values": [1.0, 2.0] }]
            }"#,
        )
        .unwrap();
        let source = JsonFileSource::new(&path);
        let a = source.fetch("AAA", range()).await.unwrap();
        let b = source.fetch("BBB", range()).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.symbols(), vec!["AAA", "BBB"]);
    }

    #[tokio::test]
    async fn batch_file_only_serves_listed_symbols() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("batch.json");
        fs::write(
            &path,
            r#"{
                "columns": [["Close", "AAA"]],
                "rows": [{ "date": "2024-01-02", "values": [1.0] }]
            }"#,
        )
        .unwrap();
        let source = JsonFileSource::new(&path);
        assert!(source.fetch("aaa", range()).await.is_ok());
        assert!(matches!(
            source.fetch("ZZZ", range()).await,
            Err(FetchError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn flat_batch_file_serves_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flat.json");
        fs::write(&path, FLAT).unwrap();
        let source = JsonFileSource::new(&path);
        for symbol in ["AAA", "ZZZ"] {
            assert!(matches!(
                source.fetch(symbol, range()).await,
                Err(FetchError::NotFound { .. })
            ));
        }
    }

    #[tokio::test]
    async fn batch_file_missing_is_io_error() {
        let source = JsonFileSource::new("/definitely/not/here.json");
        assert!(matches!(
            source.fetch("AAA", range()).await,
            Err(FetchError::Io { .. })
        ));
    }
}
