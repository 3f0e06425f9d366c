use std::{
    fs,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chart_pipeline::{
    chart::{ChartBuilder, PlaceholderReason},
    classify::{BarClass, classify},
    indicators::IndicatorRequest,
    models::{
        date_range::DateRange,
        raw::{ColumnKey, RawRow, RawTable},
    },
    normalize::normalize,
    pipeline::{ComparisonRequest, IndicatorStatus, render_comparison},
    providers::{DataSource, FetchError, InMemorySource, JsonDirSource, JsonFileSource, TransientSnafu},
};
use chrono::NaiveDate;
use tempfile::TempDir;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn january() -> DateRange {
    DateRange::parse("2024-01-01", "2024-02-01").unwrap()
}

/// Flat table from `(open, close)` pairs on consecutive days from Jan 2.
fn flat_table(prices: &[(f64, f64)]) -> RawTable {
    let columns = ["Open", "High", "Low", "Close", "Adj Close", "Volume"]
        .into_iter()
        .map(ColumnKey::simple)
        .collect();
    let rows = prices
        .iter()
        .enumerate()
        .map(|(i, &(open, close))| {
            RawRow::filled(
                day(i as u32 + 2),
                [open, open.max(close) + 1.0, open.min(close) - 1.0, close, close, 1_000.0],
            )
        })
        .collect();
    RawTable::new(columns, rows).unwrap()
}

fn scenario_source() -> InMemorySource {
    InMemorySource::new()
        .with_table("AAA", flat_table(&[(9.0, 10.0), (10.0, 12.0), (12.0, 11.0)]))
        .with_table("BBB", flat_table(&[(21.0, 20.0), (20.0, 19.0), (19.0, 21.0)]))
}

#[tokio::test]
async fn two_symbol_scenario() {
    let request = ComparisonRequest::new("AAA", "BBB", january())
        .with_indicators([IndicatorRequest::sma(2), IndicatorRequest::linear_trend()]);
    let charts = render_comparison(&scenario_source(), &request).await.unwrap();

    let a = &charts.primary.spec;
    assert_eq!(a.symbol(), "AAA");
    assert_eq!(a.overlays()[0].values, vec![None, Some(11.0), Some(11.5)]);
    assert_eq!(a.classification().gain_indices(), vec![0, 1]);
    assert_eq!(a.classification().loss_indices(), vec![2]);
    assert!(a.classification().flat_indices().is_empty());

    let b = &charts.secondary.spec;
    assert_eq!(b.overlays()[0].values, vec![None, Some(19.5), Some(20.0)]);
    assert_eq!(
        b.classification().classes(),
        &[BarClass::Loss, BarClass::Loss, BarClass::Gain]
    );

    assert!(b.shares_axis_with(a));
    assert_eq!(b.linked_to(), Some("AAA"));
    assert!(a.linked_to().is_none());
    assert!(
        charts
            .primary
            .indicators
            .iter()
            .all(|r| r.status == IndicatorStatus::Applied)
    );
}

#[tokio::test]
async fn unknown_symbol_yields_placeholder_and_keeps_link() {
    let request = ComparisonRequest::new("AAA", "NOPE", january()).with_indicators([IndicatorRequest::sma(2)]);
    let charts = render_comparison(&scenario_source(), &request).await.unwrap();

    let empty = &charts.secondary.spec;
    assert!(empty.bars().is_empty());
    assert!(empty.overlays().is_empty());
    assert_eq!(empty.placeholder().unwrap().reason, PlaceholderReason::NoData);
    assert!(empty.shares_axis_with(&charts.primary.spec));
    assert_eq!(charts.secondary.indicators[0].status, IndicatorStatus::Omitted);
}

#[tokio::test]
async fn unsupported_indicator_is_reported_not_dropped() {
    let request = ComparisonRequest::new("AAA", "BBB", january()).with_indicators([
        IndicatorRequest::new("Bollinger Bands"),
        IndicatorRequest::sma(2),
    ]);
    let charts = render_comparison(&scenario_source(), &request).await.unwrap();

    let rejected: Vec<_> = charts.primary.rejections().map(|(label, _)| label).collect();
    assert_eq!(rejected, vec!["Bollinger Bands"]);
    assert_eq!(charts.primary.spec.overlays().len(), 1);
    assert_eq!(charts.secondary.rejections().count(), 1);
}

struct Flaky {
    calls: AtomicUsize,
    inner: InMemorySource,
}

#[async_trait]
impl DataSource for Flaky {
    async fn fetch(&self, symbol: &str, range: DateRange) -> Result<RawTable, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if symbol == "BBB" {
            return TransientSnafu {
                symbol,
                message: "gateway timeout",
            }
            .fail();
        }
        self.inner.fetch(symbol, range).await
    }
}

#[tokio::test]
async fn transient_failure_degrades_only_that_chart() {
    let source = Flaky {
        calls: AtomicUsize::new(0),
        inner: scenario_source(),
    };
    let request = ComparisonRequest::new("AAA", "BBB", january());
    let charts = render_comparison(&source, &request).await.unwrap();

    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert_eq!(charts.primary.spec.bars().len(), 3);
    let placeholder = charts.secondary.spec.placeholder().unwrap();
    assert_eq!(placeholder.reason, PlaceholderReason::FetchFailed);
    assert!(placeholder.message.contains("gateway timeout"));
}

#[tokio::test]
async fn works_through_dyn_source() {
    let source: Box<dyn DataSource> = Box::new(scenario_source());
    let charts = render_comparison(&*source, &ComparisonRequest::new("BBB", "AAA", january()))
        .await
        .unwrap();
    assert_eq!(charts.secondary.spec.linked_to(), Some("BBB"));
}

#[test]
fn compound_columns_round_trip_in_row_order() {
    let columns = vec![
        ColumnKey::compound("Close", "XYZ"),
        ColumnKey::compound("Close", "OTHER"),
        ColumnKey::compound("High", "XYZ"),
        ColumnKey::compound("Low", "XYZ"),
        ColumnKey::compound("Open", "XYZ"),
    ];
    let source_rows = [
        (day(2), 10.5, 11.0, 9.5, 10.0),
        (day(3), 10.0, 10.75, 9.25, 10.5),
        (day(4), 11.25, 11.5, 10.0, 10.0),
    ];
    let rows = source_rows
        .iter()
        .map(|&(d, close, high, low, open)| RawRow::filled(d, [close, 999.0, high, low, open]))
        .collect();
    let table = RawTable::new(columns, rows).unwrap();

    let series = normalize(&table, "XYZ", january()).unwrap();
    assert_eq!(series.len(), source_rows.len());
    for (bar, &(d, close, high, low, open)) in series.bars().iter().zip(&source_rows) {
        assert_eq!(bar.date(), d);
        assert_eq!(bar.open(), open);
        assert_eq!(bar.high(), high);
        assert_eq!(bar.low(), low);
        assert_eq!(bar.close(), close);
        assert_eq!(bar.volume(), None);
    }
}

#[test]
fn empty_series_builds_placeholder_spec() {
    let series = normalize(&RawTable::empty(), "XYZ", january()).unwrap();
    let spec = ChartBuilder::new(&series, &classify(&series)).build().unwrap();
    assert!(spec.bars().is_empty());
    assert!(spec.overlays().is_empty());
    assert!(spec.is_placeholder());
}

#[tokio::test]
async fn file_sources_feed_the_pipeline() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("AAA.json"),
        serde_json::to_string(&flat_table(&[(9.0, 10.0), (10.0, 12.0)])).unwrap(),
    )
    .unwrap();
    let charts = render_comparison(
        &JsonDirSource::new(dir.path()),
        &ComparisonRequest::new("AAA", "MISSING", january()),
    )
    .await
    .unwrap();
    assert_eq!(charts.primary.spec.bars().len(), 2);
    assert!(charts.secondary.spec.is_placeholder());

    let batch = dir.path().join("batch.json");
    fs::write(
        &batch,
        r#"{
            "columns": [["Open","AAA"],["High","AAA"],["Low","AAA"],["Close","AAA"],
                        ["Open","BBB"],["High","BBB"],["Low","BBB"],["Close","BBB"]],
            "rows": [
                {"date": "2024-01-02", "values": [1.0, 2.0, 0.5, 1.5, 5.0, 5.0, 4.0, 4.5]},
                {"date": "2024-01-03", "values": [1.5, 1.5, 1.0, 1.0, 4.5, 6.0, 4.5, 6.0]}
            ]
        }"#,
    )
    .unwrap();
    let charts = render_comparison(
        &JsonFileSource::new(&batch),
        &ComparisonRequest::new("AAA", "BBB", january()).with_indicators([IndicatorRequest::linear_trend()]),
    )
    .await
    .unwrap();
    assert_eq!(charts.primary.spec.bars()[1].close(), 1.0);
    assert_eq!(charts.secondary.spec.bars()[1].close(), 6.0);
    assert_eq!(charts.secondary.spec.overlays()[0].values, vec![Some(4.5), Some(6.0)]);

    let json = serde_json::to_value(&charts).unwrap();
    assert_eq!(json["secondary"]["spec"]["linked_to"], "AAA");
    assert_eq!(json["primary"]["indicators"][0]["status"], "applied");
}

#[tokio::test]
async fn flat_batch_file_never_lends_bars_to_another_symbol() {
    let dir = TempDir::new().unwrap();
    let batch = dir.path().join("flat.json");
    fs::write(&batch, serde_json::to_string(&flat_table(&[(9.0, 10.0)])).unwrap()).unwrap();

    let charts = render_comparison(
        &JsonFileSource::new(&batch),
        &ComparisonRequest::new("AAA", "ZZZ", january()),
    )
    .await
    .unwrap();
    for panel in [&charts.primary, &charts.secondary] {
        assert!(panel.spec.bars().is_empty());
        assert_eq!(panel.spec.placeholder().unwrap().reason, PlaceholderReason::NoData);
    }
}
