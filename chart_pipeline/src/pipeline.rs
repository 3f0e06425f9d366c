//! Two-instrument comparison: fetch, normalize, classify, compute overlays, build.
//!
//! Each instrument runs the same pure pipeline. The only coupling between the
//! two is the horizontal axis: the secondary chart is built after the primary
//! one and borrows its [`AxisHandle`].

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::{
    chart::{AxisHandle, BuildError, ChartBuilder, ChartSpec, DisplayOptions, Placeholder},
    classify::classify,
    indicators::{IndicatorError, IndicatorOutcome, IndicatorRequest, compute_indicators},
    models::{bar_series::BarSeries, date_range::DateRange, raw::RawTable},
    normalize::normalize_with_report,
    providers::{DataSource, FetchError},
};

/// What the user asked to compare.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRequest {
    pub primary: String,
    pub secondary: String,
    pub range: DateRange,
    pub indicators: Vec<IndicatorRequest>,
    pub display: DisplayOptions,
}

impl ComparisonRequest {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>, range: DateRange) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            range,
            indicators: Vec::new(),
            display: DisplayOptions::default(),
        }
    }

    pub fn with_indicators(mut self, indicators: impl IntoIterator<Item = IndicatorRequest>) -> Self {
        self.indicators.extend(indicators);
        self
    }

    pub fn with_display(mut self, display: DisplayOptions) -> Self {
        self.display = display;
        self
    }
}

/// How one indicator request fared on one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndicatorStatus {
    /// Drawn as an overlay.
    Applied,
    /// Valid, but the chart has too little data for it.
    Omitted,
    /// Unknown kind or bad parameter.
    Rejected { error: IndicatorError },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorReport {
    pub label: String,
    #[serde(flatten)]
    pub status: IndicatorStatus,
}

/// A chart plus the fate of every indicator requested for it, in request order.
#[derive(Debug, Clone, Serialize)]
pub struct ChartPanel {
    pub spec: ChartSpec,
    pub indicators: Vec<IndicatorReport>,
}

impl ChartPanel {
    pub fn rejections(&self) -> impl Iterator<Item = (&str, &IndicatorError)> {
        self.indicators.iter().filter_map(|r| match &r.status {
            IndicatorStatus::Rejected { error } => Some((r.label.as_str(), error)),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonCharts {
    pub primary: ChartPanel,
    pub secondary: ChartPanel,
}

/// Builds one chart from a fetch result.
///
/// Fetch failures and unresolvable column layouts degrade to a placeholder
/// chart; they are logged, not returned. The only error is a [`BuildError`],
/// which cannot happen for inputs derived here from a single series.
pub fn chart_from_table(
    fetched: Result<RawTable, FetchError>,
    symbol: &str,
    range: DateRange,
    indicators: &[IndicatorRequest],
    display: DisplayOptions,
    axis: Option<AxisHandle>,
) -> Result<ChartPanel, BuildError> {
    let (series, placeholder) = match fetched {
        Ok(table) => match normalize_with_report(&table, symbol, range) {
            Ok((series, report)) => {
                if report.total_dropped() > 0 {
                    debug!(symbol, ?report, "rows dropped during normalization");
                }
                (series, None)
            }
            Err(err) => {
                warn!(symbol, error = %err, "column resolution failed");
                (
                    BarSeries::empty(symbol, range),
                    Some(Placeholder::column_resolution(symbol, &err)),
                )
            }
        },
        Err(FetchError::NotFound { .. }) => (BarSeries::empty(symbol, range), None),
        Err(err) => {
            warn!(symbol, error = %err, transient = err.is_transient(), "fetch failed, rendering empty chart");
            (
                BarSeries::empty(symbol, range),
                Some(Placeholder::fetch_failed(symbol, &err)),
            )
        }
    };

    let classification = classify(&series);
    let outcomes = compute_indicators(&series, indicators);

    let mut builder = ChartBuilder::new(&series, &classification)
        .overlays(outcomes.iter().filter_map(|o| o.indicator().cloned()))
        .display(display);
    if let Some(axis) = axis {
        builder = builder.sync_axis(axis);
    }
    if let Some(placeholder) = placeholder {
        builder = builder.placeholder(placeholder);
    }
    let spec = builder.build()?;

    let indicators = outcomes
        .into_iter()
        .map(|o| report_for(o, spec.is_placeholder()))
        .collect();
    Ok(ChartPanel { spec, indicators })
}

fn report_for(outcome: IndicatorOutcome, placeholder: bool) -> IndicatorReport {
    let status = match outcome.result {
        Err(error) => IndicatorStatus::Rejected { error },
        Ok(Some(_)) if !placeholder => IndicatorStatus::Applied,
        Ok(_) => IndicatorStatus::Omitted,
    };
    IndicatorReport {
        label: outcome.request.label().to_string(),
        status,
    }
}

/// Fetches both symbols concurrently and builds their synchronized charts.
#[instrument(skip_all, fields(primary = %request.primary, secondary = %request.secondary, range = %request.range))]
pub async fn render_comparison<S>(source: &S, request: &ComparisonRequest) -> Result<ComparisonCharts, BuildError>
where
    S: DataSource + ?Sized,
{
    let (first, second) = futures::join!(
        source.fetch(&request.primary, request.range),
        source.fetch(&request.secondary, request.range),
    );

    let primary = chart_from_table(
        first,
        &request.primary,
        request.range,
        &request.indicators,
        request.display,
        None,
    )?;
    let secondary = chart_from_table(
        second,
        &request.secondary,
        request.range,
        &request.indicators,
        request.display,
        Some(primary.spec.x_axis()),
    )?;
    debug!(
        primary_bars = primary.spec.bars().len(),
        secondary_bars = secondary.spec.bars().len(),
        "comparison rendered"
    );

    Ok(ComparisonCharts { primary, secondary })
}
