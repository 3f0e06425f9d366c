//! Column-layout strategies for locating OHLCV fields in a [`RawTable`](crate::models::raw::RawTable) header.
//!
//! The header shape is inspected once by [`detect_schema`]; afterwards every
//! field lookup goes through the chosen [`ColumnSchema`].

use std::fmt;

use serde::Serialize;

use crate::models::raw::ColumnKey;

/// The price and volume fields a bar is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Field {
    /// Fields without which no bar can be built.
    pub const REQUIRED: [Field; 4] = [Field::Open, Field::High, Field::Low, Field::Close];

    /// Header spelling used by data vendors.
    pub const fn name(self) -> &'static str {
        match self {
            Field::Open => "Open",
            Field::High => "High",
            Field::Low => "Low",
            Field::Close => "Close",
            Field::Volume => "Volume",
        }
    }

    fn matches(self, header: &str) -> bool {
        header.trim().eq_ignore_ascii_case(self.name())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strategy for finding a field's column index within a header.
pub trait ColumnSchema: fmt::Debug + Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Index of `field` for `symbol`, if the header has one.
    fn locate(&self, columns: &[ColumnKey], field: Field, symbol: &str) -> Option<usize>;
}

/// Single-symbol header: `Open`, `High`, `Low`, `Close`, `Volume`.
///
/// The table is assumed to belong to the requested symbol.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatSchema;

impl ColumnSchema for FlatSchema {
    fn name(&self) -> &'static str {
        "flat"
    }

    fn locate(&self, columns: &[ColumnKey], field: Field, _symbol: &str) -> Option<usize> {
        columns.iter().position(|key| match key {
            ColumnKey::Simple(name) => field.matches(name),
            ColumnKey::Compound(..) => false,
        })
    }
}

/// Batched header keyed by `(field, symbol)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompoundSchema;

impl ColumnSchema for CompoundSchema {
    fn name(&self) -> &'static str {
        "compound"
    }

    fn locate(&self, columns: &[ColumnKey], field: Field, symbol: &str) -> Option<usize> {
        let symbol = symbol.trim();
        columns.iter().position(|key| match key {
            ColumnKey::Compound(name, sym) => {
                field.matches(name) && sym.trim().eq_ignore_ascii_case(symbol)
            }
            ColumnKey::Simple(_) => false,
        })
    }
}

/// The header shape as seen by [`detect_schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderShape {
    Flat,
    Compound,
    Mixed,
}

pub fn header_shape(columns: &[ColumnKey]) -> HeaderShape {
    let compound = columns.iter().filter(|k| k.is_compound()).count();
    match compound {
        0 => HeaderShape::Flat,
        n if n == columns.len() => HeaderShape::Compound,
        _ => HeaderShape::Mixed,
    }
}

/// Picks the schema for a header, or `None` when simple and compound keys are mixed.
pub fn detect_schema(columns: &[ColumnKey]) -> Option<Box<dyn ColumnSchema>> {
    match header_shape(columns) {
        HeaderShape::Flat => Some(Box::new(FlatSchema)),
        HeaderShape::Compound => Some(Box::new(CompoundSchema)),
        HeaderShape::Mixed => None,
    }
}

/// Resolved column indices for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub open: usize,
    pub high: usize,
    pub low: usize,
    pub close: usize,
    pub volume: Option<usize>,
}

impl ColumnMap {
    /// Locates every required field, or returns the ones that are missing.
    pub fn resolve(
        schema: &dyn ColumnSchema,
        columns: &[ColumnKey],
        symbol: &str,
    ) -> Result<Self, Vec<Field>> {
        let mut found = [None; 4];
        let mut missing = Vec::new();
        for (slot, field) in found.iter_mut().zip(Field::REQUIRED) {
            *slot = schema.locate(columns, field, symbol);
            if slot.is_none() {
                missing.push(field);
            }
        }
        match found {
            [Some(open), Some(high), Some(low), Some(close)] => Ok(Self {
                open,
                high,
                low,
                close,
                volume: schema.locate(columns, Field::Volume, symbol),
            }),
            _ => Err(missing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_header() -> Vec<ColumnKey> {
        ["Open", "High", "Low", "Close", "Adj Close", "Volume"]
            .into_iter()
            .map(ColumnKey::simple)
            .collect()
    }

    fn compound_header(symbols: &[&str]) -> Vec<ColumnKey> {
        let mut out = Vec::new();
        for field in ["Close", "High", "Low", "Open", "Volume"] {
            for s in symbols {
                out.push(ColumnKey::compound(field, *s));
            }
        }
        out
    }

    #[test]
    fn detects_shapes() {
        assert_eq!(header_shape(&flat_header()), HeaderShape::Flat);
        assert_eq!(header_shape(&compound_header(&["A"])), HeaderShape::Compound);

        let mut mixed = flat_header();
        mixed.push(ColumnKey::compound("Close", "A"));
        assert_eq!(header_shape(&mixed), HeaderShape::Mixed);
        assert!(detect_schema(&mixed).is_none());
    }

    #[test]
    fn flat_schema_ignores_adj_close() {
        let map = ColumnMap::resolve(&FlatSchema, &flat_header(), "ANY").unwrap();
        assert_eq!(
            map,
            ColumnMap {
                open: 0,
                high: 1,
                low: 2,
                close: 3,
                volume: Some(5)
            }
        );
    }

    #[test]
    fn compound_schema_picks_requested_symbol() {
        let header = compound_header(&["AAA", "BBB"]);
        let map = ColumnMap::resolve(&CompoundSchema, &header, "bbb").unwrap();
        assert_eq!(header[map.close], ColumnKey::compound("Close", "BBB"));
        assert_eq!(header[map.open], ColumnKey::compound("Open", "BBB"));
        assert_eq!(map.volume.map(|i| &header[i]), Some(&ColumnKey::compound("Volume", "BBB")));
    }

    #[test]
    fn reports_missing_fields() {
        let header = vec![ColumnKey::compound("Close", "XYZ"), ColumnKey::compound("Open", "XYZ")];
        let missing = ColumnMap::resolve(&CompoundSchema, &header, "XYZ").unwrap_err();
        assert_eq!(missing, vec![Field::High, Field::Low]);

        let all = ColumnMap::resolve(&CompoundSchema, &header, "OTHER").unwrap_err();
        assert_eq!(all, Field::REQUIRED.to_vec());
    }
}
