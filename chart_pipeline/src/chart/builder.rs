use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    chart::{AxisHandle, AxisRange, ChartSpec, DisplayOptions, Placeholder},
    classify::Classification,
    indicators::Indicator,
    models::bar_series::BarSeries,
};

/// Inputs that do not line up with the series they claim to describe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("classification covers {actual} bars but the series has {expected}")]
    ClassificationLength { expected: usize, actual: usize },

    #[error("overlay '{label}' has {actual} values but the series has {expected} bars")]
    OverlayLength {
        label: String,
        expected: usize,
        actual: usize,
    },
}

/// Assembles a [`ChartSpec`] from a series and its derived data.
///
/// An empty series always produces a placeholder spec (zero bars, zero
/// overlays) instead of an error.
///
/// ```
/// use chart_pipeline::chart::ChartBuilder;
/// use chart_pipeline::classify::classify;
/// use chart_pipeline::models::{bar_series::BarSeries, date_range::DateRange};
///
/// let range = DateRange::parse("2024-01-01", "2024-02-01").unwrap();
/// let series = BarSeries::empty("XYZ", range);
/// let spec = ChartBuilder::new(&series, &classify(&series)).build().unwrap();
/// assert!(spec.is_placeholder());
/// assert!(spec.bars().is_empty());
/// ```
#[derive(Debug)]
pub struct ChartBuilder<'a> {
    series: &'a BarSeries,
    classification: &'a Classification,
    overlays: Vec<Indicator>,
    display: DisplayOptions,
    axis: Option<AxisHandle>,
    placeholder: Option<Placeholder>,
}

impl<'a> ChartBuilder<'a> {
    pub fn new(series: &'a BarSeries, classification: &'a Classification) -> Self {
        Self {
            series,
            classification,
            overlays: Vec::new(),
            display: DisplayOptions::default(),
            axis: None,
            placeholder: None,
        }
    }

    pub fn overlays(mut self, overlays: impl IntoIterator<Item = Indicator>) -> Self {
        self.overlays.extend(overlays);
        self
    }

    pub fn display(mut self, display: DisplayOptions) -> Self {
        self.display = display;
        self
    }

    /// Share the horizontal axis of a previously built chart.
    pub fn sync_axis(mut self, axis: AxisHandle) -> Self {
        self.axis = Some(axis);
        self
    }

    /// Explanation used if the series turns out to be empty.
    /// Defaults to [`Placeholder::no_data`].
    pub fn placeholder(mut self, placeholder: Placeholder) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn build(self) -> Result<ChartSpec, BuildError> {
        let series = self.series;
        let symbol = series.symbol();
        let range = series.range();

        let linked_to = self.axis.as_ref().map(|a| a.owner().to_string());

        if series.is_empty() {
            let placeholder = self
                .placeholder
                .unwrap_or_else(|| Placeholder::no_data(symbol, range));
            warn!(symbol, reason = ?placeholder.reason, "building placeholder chart");
            let x_axis = self
                .axis
                .unwrap_or_else(|| AxisHandle::new(symbol, AxisRange::covering(range)));
            return Ok(ChartSpec {
                symbol: symbol.to_string(),
                range,
                x_axis,
                linked_to,
                bars: Vec::new(),
                classes: Classification::default(),
                overlays: Vec::new(),
                display: self.display,
                placeholder: Some(placeholder),
            });
        }

        let expected = series.len();
        if self.classification.len() != expected {
            return Err(BuildError::ClassificationLength {
                expected,
                actual: self.classification.len(),
            });
        }
        if let Some(bad) = self.overlays.iter().find(|o| o.len() != expected) {
            return Err(BuildError::OverlayLength {
                label: bad.label.clone(),
                expected,
                actual: bad.len(),
            });
        }

        let x_axis = match self.axis {
            Some(axis) => axis,
            None => {
                let extent = match (series.first_date(), series.last_date()) {
                    (Some(start), Some(end)) => AxisRange { start, end },
                    _ => AxisRange::covering(range),
                };
                AxisHandle::new(symbol, extent)
            }
        };
        debug!(
            symbol,
            bars = expected,
            overlays = self.overlays.len(),
            linked = linked_to.is_some(),
            "built chart spec"
        );

        Ok(ChartSpec {
            symbol: symbol.to_string(),
            range,
            x_axis,
            linked_to,
            bars: series.bars().to_vec(),
            classes: self.classification.clone(),
            overlays: self.overlays,
            display: self.display,
            placeholder: None,
        })
    }
}
