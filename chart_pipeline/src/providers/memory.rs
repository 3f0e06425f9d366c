use async_trait::async_trait;
use indexmap::IndexMap;

use crate::{
    models::{date_range::DateRange, raw::RawTable},
    providers::{DataSource, FetchError, NotFoundSnafu},
};

/// Serves fixed tables from memory, keyed by upper-cased symbol.
///
/// Rows outside the requested range are left in place; trimming to the range
/// is the normalizer's job.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    tables: IndexMap<String, RawTable>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, symbol: &str, table: RawTable) -> Self {
        self.insert(symbol, table);
        self
    }

    pub fn insert(&mut self, symbol: &str, table: RawTable) {
        self.tables.insert(symbol.trim().to_uppercase(), table);
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

#[async_trait]
impl DataSource for InMemorySource {
    async fn fetch(&self, symbol: &str, _range: DateRange) -> Result<RawTable, FetchError> {
        match self.tables.get(&symbol.trim().to_uppercase()) {
            Some(table) => Ok(table.clone()),
            None => NotFoundSnafu { symbol }.fail(),
        }
    }
}
