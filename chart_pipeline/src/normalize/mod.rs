//! Bar series normalizer: raw vendor tables in, canonical [`BarSeries`] out.
//!
//! The header is inspected once to choose a [`ColumnSchema`]
//! ([`FlatSchema`](schema::FlatSchema) or [`CompoundSchema`](schema::CompoundSchema)),
//! the four price columns (plus volume, if present) are resolved for the
//! requested symbol, and each row becomes a validated [`Bar`].
//!
//! Outcomes:
//! - no rows at all: an empty series, never an error
//! - rows present but the symbol's price columns cannot be found:
//!   [`NormalizeError::SymbolDataUnavailable`]
//! - individual unusable rows: skipped and counted in [`NormalizeReport`]

pub mod schema;

use snafu::{Backtrace, OptionExt, ResultExt, Snafu};
use tracing::{debug, warn};

use crate::models::{
    bar::{Bar, BarError},
    bar_series::{BarSeries, SeriesError},
    date_range::DateRange,
    raw::{RawRow, RawTable},
};

use self::schema::{ColumnMap, ColumnSchema, Field, detect_schema};

/// Errors that prevent any bar from being extracted for a symbol.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum NormalizeError {
    /// The header mixes simple and compound keys, so no single schema applies.
    #[snafu(display("cannot resolve columns for {symbol}: header mixes simple and compound keys"))]
    MixedColumnShape { symbol: String, backtrace: Backtrace },

    /// Rows exist, but the required price columns for the symbol do not.
    #[snafu(display(
        "data for {symbol} unavailable: {schema} header lacks {}",
        join_fields(missing)
    ))]
    SymbolDataUnavailable {
        symbol: String,
        schema: &'static str,
        missing: Vec<Field>,
        backtrace: Backtrace,
    },

    /// The extracted bars did not form a valid series.
    #[snafu(display("normalized bars for {symbol} do not form a valid series: {source}"))]
    InvalidSeries {
        symbol: String,
        source: SeriesError,
        backtrace: Backtrace,
    },
}

fn join_fields(fields: &[Field]) -> String {
    fields.iter().map(|f| f.name()).collect::<Vec<_>>().join(", ")
}

/// Rows dropped while normalizing, by reason.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Rows dated outside the requested range.
    pub rows_out_of_range: usize,
    /// Later rows repeating an already-seen date.
    pub duplicate_dates_dropped: usize,
    /// Rows missing an open, high, low or close value.
    pub incomplete_rows_skipped: usize,
    /// Rows whose prices break the OHLC ordering.
    pub invalid_bars_skipped: usize,
}

impl NormalizeReport {
    pub fn total_dropped(&self) -> usize {
        self.rows_out_of_range
            + self.duplicate_dates_dropped
            + self.incomplete_rows_skipped
            + self.invalid_bars_skipped
    }
}

/// Normalizes `table` into the bars of `symbol` within `range`.
pub fn normalize(table: &RawTable, symbol: &str, range: DateRange) -> Result<BarSeries, NormalizeError> {
    normalize_with_report(table, symbol, range).map(|(series, _)| series)
}

/// Like [`normalize`], also returning what was dropped along the way.
pub fn normalize_with_report(
    table: &RawTable,
    symbol: &str,
    range: DateRange,
) -> Result<(BarSeries, NormalizeReport), NormalizeError> {
    let mut report = NormalizeReport::default();

    if table.is_empty() {
        debug!(symbol, %range, "no rows, producing empty series");
        return Ok((BarSeries::empty(symbol, range), report));
    }

    let schema: Box<dyn ColumnSchema> =
        detect_schema(table.columns()).context(MixedColumnShapeSnafu { symbol })?;
    let map = ColumnMap::resolve(&*schema, table.columns(), symbol).map_err(|missing| {
        SymbolDataUnavailableSnafu {
            symbol,
            schema: schema.name(),
            missing,
        }
        .build()
    })?;
    debug!(symbol, schema = schema.name(), ?map, "resolved columns");

    let mut bars: Vec<Bar> = Vec::with_capacity(table.rows().len());
    for row in table.rows() {
        if !range.contains(row.date) {
            report.rows_out_of_range += 1;
            continue;
        }
        match bar_from_row(row, &map) {
            RowOutcome::Bar(bar) => bars.push(bar),
            RowOutcome::Incomplete => report.incomplete_rows_skipped += 1,
            RowOutcome::Invalid(err) => {
                debug!(symbol, date = %row.date, error = %err, "skipping invalid bar");
                report.invalid_bars_skipped += 1;
            }
        }
    }
    if report.incomplete_rows_skipped + report.invalid_bars_skipped > 0 {
        warn!(
            symbol,
            incomplete = report.incomplete_rows_skipped,
            invalid = report.invalid_bars_skipped,
            kept = bars.len(),
            "skipped unusable rows"
        );
    }

    // Stable sort keeps the first occurrence of a repeated date in front.
    bars.sort_by_key(Bar::date);
    let before = bars.len();
    bars.dedup_by_key(|bar| bar.date());
    report.duplicate_dates_dropped = before - bars.len();
    if report.duplicate_dates_dropped > 0 {
        warn!(symbol, dropped = report.duplicate_dates_dropped, "dropped duplicate dates");
    }

    let series = BarSeries::new(symbol, range, bars).context(InvalidSeriesSnafu { symbol })?;
    Ok((series, report))
}

enum RowOutcome {
    Bar(Bar),
    Incomplete,
    Invalid(BarError),
}

fn bar_from_row(row: &RawRow, map: &ColumnMap) -> RowOutcome {
    let cell = |idx: usize| row.values.get(idx).copied().flatten().filter(|v| v.is_finite());

    let (Some(open), Some(high), Some(low), Some(close)) =
        (cell(map.open), cell(map.high), cell(map.low), cell(map.close))
    else {
        return RowOutcome::Incomplete;
    };
    let volume = map.volume.and_then(cell);

    match Bar::new(row.date, open, high, low, close, volume) {
        Ok(bar) => RowOutcome::Bar(bar),
        Err(err) => RowOutcome::Invalid(err),
    }
}
