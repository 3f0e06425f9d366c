//! An ordered run of daily bars for one instrument.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::models::{bar::Bar, date_range::DateRange};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("bar dates must be strictly increasing: {previous} is followed by {next}")]
    NotIncreasing { previous: NaiveDate, next: NaiveDate },

    #[error("bar dated {date} lies outside requested range {range}")]
    OutOfRange { date: NaiveDate, range: DateRange },
}

/// The bars of one symbol over a requested [`DateRange`].
///
/// Dates are strictly increasing and fall inside `range`. An empty series
/// is a valid value meaning "no data for this symbol and range"; it still
/// remembers the range it was requested for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    symbol: String,
    range: DateRange,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, range: DateRange, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for bar in &bars {
            if !range.contains(bar.date()) {
                return Err(SeriesError::OutOfRange {
                    date: bar.date(),
                    range,
                });
            }
        }
        for pair in bars.windows(2) {
            if pair[0].date() >= pair[1].date() {
                return Err(SeriesError::NotIncreasing {
                    previous: pair[0].date(),
                    next: pair[1].date(),
                });
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            range,
            bars,
        })
    }

    /// A series with no bars.
    pub fn empty(symbol: impl Into<String>, range: DateRange) -> Self {
        Self {
            symbol: symbol.into(),
            range,
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(Bar::date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(Bar::close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(Bar::date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(Bar::date)
    }
}
