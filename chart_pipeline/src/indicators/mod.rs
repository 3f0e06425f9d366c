//! Indicator engine: overlays derived from a series' closing prices.
//!
//! Callers hand in [`IndicatorRequest`]s, which are labels as a picker widget
//! would submit them (`"30 Day SMA"`, `"Linear Regression Line"`).
//! [`compute_indicators`] answers every request, in order, with an
//! [`IndicatorOutcome`]:
//!
//! - `Ok(Some(indicator))`: computed
//! - `Ok(None)`: omitted because the series is too short (linear trend with < 2 bars)
//! - `Err(_)`: rejected, either an unknown kind or an invalid parameter
//!
//! A rejected request never prevents its siblings from computing.

pub mod sma;
pub mod trend;

use std::{fmt, num::IntErrorKind, str::FromStr};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::bar_series::BarSeries;

pub use self::sma::simple_moving_average;
pub use self::trend::{LinearFit, linear_fit};

/// Why an indicator request was turned down.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndicatorError {
    #[error("unsupported indicator '{label}'")]
    Unsupported { label: String },

    #[error("invalid parameter for '{label}': {message}")]
    InvalidParameter { label: String, message: String },
}

/// The indicators the engine knows how to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndicatorKind {
    /// Mean close over a trailing window of `window` bars.
    SimpleMovingAverage { window: usize },
    /// Least-squares line through all closes.
    LinearTrend,
}

impl IndicatorKind {
    /// Canonical label, as shown in pickers and legends.
    pub fn label(&self) -> String {
        match self {
            Self::SimpleMovingAverage { window } => format!("{window} Day SMA"),
            Self::LinearTrend => "Linear Regression Line".to_string(),
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for IndicatorKind {
    type Err = IndicatorError;

    /// Accepts `"<N> Day SMA"`, `"SMA(<N>)"`, `"Linear Regression Line"`,
    /// `"Linear Regression"` and `"Linear Trend"`, case-insensitively.
    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let norm = label.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();

        if matches!(
            norm.as_str(),
            "linear regression line" | "linear regression" | "linear trend"
        ) {
            return Ok(Self::LinearTrend);
        }

        let window = norm
            .strip_suffix(" day sma")
            .or_else(|| norm.strip_prefix("sma(").and_then(|rest| rest.strip_suffix(')')))
            .map(str::trim);
        let Some(window) = window else {
            return Err(IndicatorError::Unsupported {
                label: label.to_string(),
            });
        };

        let invalid = |message: String| IndicatorError::InvalidParameter {
            label: label.to_string(),
            message,
        };
        match window.parse::<i64>() {
            Ok(n) if n > 0 => usize::try_from(n)
                .map(|window| Self::SimpleMovingAverage { window })
                .map_err(|_| invalid(format!("window {n} is too large"))),
            Ok(n) => Err(invalid(format!("window must be positive, got {n}"))),
            Err(err) if matches!(err.kind(), IntErrorKind::PosOverflow) => {
                Err(invalid(format!("window {window} is too large")))
            }
            Err(err) if matches!(err.kind(), IntErrorKind::NegOverflow) => {
                Err(invalid(format!("window must be positive, got {window}")))
            }
            Err(_) => Err(IndicatorError::Unsupported {
                label: label.to_string(),
            }),
        }
    }
}

/// A requested overlay, identified by its label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct IndicatorRequest {
    label: String,
}

impl IndicatorRequest {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }

    pub fn sma(window: usize) -> Self {
        Self::new(IndicatorKind::SimpleMovingAverage { window }.label())
    }

    pub fn linear_trend() -> Self {
        Self::new(IndicatorKind::LinearTrend.label())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Resolves the label and checks its parameters.
    pub fn kind(&self) -> Result<IndicatorKind, IndicatorError> {
        self.label.parse()
    }
}

impl From<&str> for IndicatorRequest {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// A computed overlay aligned with the dates of its source series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    pub label: String,
    pub kind: IndicatorKind,
    /// One entry per bar; `None` where the indicator is undefined.
    pub values: Vec<Option<f64>>,
    /// Fitted line parameters, for [`IndicatorKind::LinearTrend`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit: Option<LinearFit>,
}

impl Indicator {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// The answer to one [`IndicatorRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorOutcome {
    pub request: IndicatorRequest,
    pub result: Result<Option<Indicator>, IndicatorError>,
}

impl IndicatorOutcome {
    pub fn indicator(&self) -> Option<&Indicator> {
        self.result.as_ref().ok().and_then(Option::as_ref)
    }

    pub fn rejection(&self) -> Option<&IndicatorError> {
        self.result.as_ref().err()
    }

    pub fn is_omitted(&self) -> bool {
        matches!(self.result, Ok(None))
    }
}

/// Evaluates `requests` against `series`, preserving request order.
pub fn compute_indicators(series: &BarSeries, requests: &[IndicatorRequest]) -> Vec<IndicatorOutcome> {
    let closes = series.closes();
    requests
        .iter()
        .map(|request| {
            let result = request
                .kind()
                .map(|kind| compute_one(request.label(), kind, &closes));
            match &result {
                Err(err) => warn!(symbol = series.symbol(), error = %err, "indicator rejected"),
                Ok(None) => debug!(
                    symbol = series.symbol(),
                    label = request.label(),
                    bars = closes.len(),
                    "indicator omitted, not enough bars"
                ),
                Ok(Some(_)) => {}
            }
            IndicatorOutcome {
                request: request.clone(),
                result,
            }
        })
        .collect()
}

fn compute_one(label: &str, kind: IndicatorKind, closes: &[f64]) -> Option<Indicator> {
    match kind {
        IndicatorKind::SimpleMovingAverage { window } => Some(Indicator {
            label: label.to_string(),
            kind,
            values: simple_moving_average(closes, window),
            fit: None,
        }),
        IndicatorKind::LinearTrend => {
            let fit = linear_fit(closes)?;
            Some(Indicator {
                label: label.to_string(),
                kind,
                values: fit.evaluate(closes.len()).into_iter().map(Some).collect(),
                fit: Some(fit),
            })
        }
    }
}
