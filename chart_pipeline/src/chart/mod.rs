//! Renderer-agnostic chart descriptions.
//!
//! A [`ChartSpec`] is a value object: bars, per-bar classes, indicator
//! overlays, display options and a horizontal axis. The axis is an
//! [`AxisHandle`], which another chart can borrow so the rendering layer
//! couples their pan/zoom. Nothing here knows how to draw.

pub mod builder;

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    classify::Classification,
    indicators::Indicator,
    models::{bar::Bar, date_range::DateRange},
};

pub use self::builder::{BuildError, ChartBuilder};

/// Inclusive horizontal extent of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AxisRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AxisRange {
    /// The days of a half-open [`DateRange`], as an inclusive extent.
    pub fn covering(range: DateRange) -> Self {
        let end = range.end().pred_opt().unwrap_or(range.start());
        Self {
            start: range.start(),
            end,
        }
    }
}

/// Shared reference to one chart's horizontal axis.
///
/// Cloning a handle shares the same range; [`AxisHandle::same_axis`] tells
/// whether two handles point at one axis.
#[derive(Debug, Clone, Serialize)]
pub struct AxisHandle {
    owner: String,
    range: Arc<AxisRange>,
}

impl AxisHandle {
    pub(crate) fn new(owner: impl Into<String>, range: AxisRange) -> Self {
        Self {
            owner: owner.into(),
            range: Arc::new(range),
        }
    }

    /// Symbol of the chart that created this axis.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn range(&self) -> &AxisRange {
        &self.range
    }

    pub fn same_axis(&self, other: &AxisHandle) -> bool {
        Arc::ptr_eq(&self.range, &other.range)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendLocation {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// What clicking a legend entry does to its series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendClick {
    #[default]
    Hide,
    Mute,
    None,
}

/// Presentation switches chosen by the user, carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayOptions {
    pub show_legend: bool,
    pub legend_location: LegendLocation,
    pub legend_click: LegendClick,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_legend: true,
            legend_location: LegendLocation::TopLeft,
            legend_click: LegendClick::Hide,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderReason {
    /// The symbol has no bars in the requested range.
    NoData,
    /// The data source failed; the request was degraded to "no data".
    FetchFailed,
    /// Rows were returned but the symbol's price columns were not found.
    ColumnResolution,
}

/// Why a chart is empty, with a message the UI can show in the blank panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placeholder {
    pub reason: PlaceholderReason,
    pub message: String,
}

impl Placeholder {
    pub fn no_data(symbol: &str, range: DateRange) -> Self {
        Self {
            reason: PlaceholderReason::NoData,
            message: format!("No data for {symbol} in {range}"),
        }
    }

    pub fn fetch_failed(symbol: &str, cause: impl std::fmt::Display) -> Self {
        Self {
            reason: PlaceholderReason::FetchFailed,
            message: format!("Could not load {symbol}: {cause}"),
        }
    }

    pub fn column_resolution(symbol: &str, cause: impl std::fmt::Display) -> Self {
        Self {
            reason: PlaceholderReason::ColumnResolution,
            message: format!("Unexpected data layout for {symbol}: {cause}"),
        }
    }
}

/// A finished chart description for one instrument.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    symbol: String,
    range: DateRange,
    x_axis: AxisHandle,
    #[serde(skip_serializing_if = "Option::is_none")]
    linked_to: Option<String>,
    bars: Vec<Bar>,
    classes: Classification,
    overlays: Vec<Indicator>,
    display: DisplayOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    placeholder: Option<Placeholder>,
}

impl ChartSpec {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The date range the chart was requested for.
    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn classification(&self) -> &Classification {
        &self.classes
    }

    pub fn overlays(&self) -> &[Indicator] {
        &self.overlays
    }

    pub fn display(&self) -> &DisplayOptions {
        &self.display
    }

    /// A handle to this chart's axis, for building a synchronized chart.
    pub fn x_axis(&self) -> AxisHandle {
        self.x_axis.clone()
    }

    pub fn axis_range(&self) -> &AxisRange {
        self.x_axis.range()
    }

    /// Owner of the borrowed axis, when this chart was built linked to another.
    pub fn linked_to(&self) -> Option<&str> {
        self.linked_to.as_deref()
    }

    pub fn shares_axis_with(&self, other: &ChartSpec) -> bool {
        self.x_axis.same_axis(&other.x_axis)
    }

    pub fn placeholder(&self) -> Option<&Placeholder> {
        self.placeholder.as_ref()
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }
}
