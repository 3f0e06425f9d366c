//! Canonical in-memory representation of one daily OHLC(V) observation.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Reasons a set of prices cannot form a [`Bar`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidPrice { field: &'static str, value: f64 },

    #[error("volume must be a finite, non-negative number (got {0})")]
    InvalidVolume(f64),

    #[error("prices out of order: low {low} <= open/close ({open}, {close}) <= high {high} does not hold")]
    OutOfOrder {
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },
}

/// A single trading-day bar.
///
/// Fields are private so the OHLC invariant checked in [`Bar::new`] cannot be
/// broken after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    volume: Option<f64>,
}

impl Bar {
    /// Creates a bar, enforcing `low <= min(open, close) <= max(open, close) <= high`
    /// over finite, non-negative prices.
    pub fn new(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<f64>,
    ) -> Result<Self, BarError> {
        for (field, value) in [("open", open), ("high", high), ("low", low), ("close", close)] {
            if !value.is_finite() || value < 0.0 {
                return Err(BarError::InvalidPrice { field, value });
            }
        }
        if let Some(v) = volume {
            if !v.is_finite() || v < 0.0 {
                return Err(BarError::InvalidVolume(v));
            }
        }
        if low > open.min(close) || open.max(close) > high {
            return Err(BarError::OutOfOrder {
                open,
                high,
                low,
                close,
            });
        }
        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn open(&self) -> f64 {
        self.open
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn close(&self) -> f64 {
        self.close
    }

    pub fn volume(&self) -> Option<f64> {
        self.volume
    }
}
