use anyhow::{Context, bail};

use crate::{
    config::AppConfig,
    indicators::IndicatorRequest,
    models::date_range::DateRange,
    pipeline::ComparisonRequest,
    providers::{DataSource, JsonDirSource, JsonFileSource},
};

use super::commands::{CompareArgs, SourceArgs};

/// Merges command-line arguments over the configured defaults.
pub fn comparison_request(args: &CompareArgs, cfg: &AppConfig) -> anyhow::Result<ComparisonRequest> {
    let pick = |arg: &Option<String>, fallback: &str| -> anyhow::Result<String> {
        let symbol = arg.as_deref().unwrap_or(fallback).trim().to_uppercase();
        if symbol.is_empty() {
            bail!("symbol cannot be empty");
        }
        Ok(symbol)
    };
    let primary = pick(&args.primary, &cfg.defaults.primary)?;
    let secondary = pick(&args.secondary, &cfg.defaults.secondary)?;

    let start = args
        .start
        .clone()
        .unwrap_or_else(|| cfg.defaults.start.to_string());
    let end = args.end.clone().unwrap_or_else(|| cfg.defaults.end.to_string());
    let range = DateRange::parse(&start, &end).context("invalid date range")?;

    let indicators = if args.all_indicators {
        cfg.indicator_requests()
    } else {
        args.indicators.iter().map(|l| IndicatorRequest::new(l.as_str())).collect()
    };

    let mut display = cfg.display;
    if args.no_legend {
        display.show_legend = false;
    }

    Ok(ComparisonRequest::new(primary, secondary, range)
        .with_indicators(indicators)
        .with_display(display))
}

/// The data source selected by `--data-dir` / `--batch-file`.
pub fn data_source(args: &SourceArgs) -> anyhow::Result<Box<dyn DataSource>> {
    match (&args.data_dir, &args.batch_file) {
        (Some(dir), None) => Ok(Box::new(JsonDirSource::new(dir))),
        (None, Some(file)) => Ok(Box::new(JsonFileSource::new(file))),
        _ => bail!("exactly one of --data-dir or --batch-file is required"),
    }
}
