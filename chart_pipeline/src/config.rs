//! Application configuration: parsing, normalization, and loading.
//!
//! The TOML file supplies what the comparison UI needs before the user has
//! typed anything:
//! - `[defaults]`: initial symbols and date range
//! - `[display]`: legend options passed through to every chart
//! - `indicator_options`: the labels offered in the indicator picker
//! - `tickers`: the list of available tickers shown to the user
//!
//! Every key is optional; missing keys fall back to [`AppConfig::default`].
//!
//! Normalization trims whitespace, upper-cases ticker symbols, de-duplicates
//! lists while preserving order, and rejects indicator options the engine
//! cannot compute.
//!
//! Entrypoints:
//! - Parse + normalize from a TOML string: [`load_config_str`]
//! - Parse + normalize from a file path: [`load_config_path`]
//! - Resolve the path from a flag or the environment: [`load_config`]

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::NaiveDate;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use shared_utils::env::get_env_var_opt;
use tracing::debug;

use crate::{
    chart::DisplayOptions,
    indicators::IndicatorRequest,
    models::date_range::{DateRange, DateRangeError},
};

/// Environment variable consulted when no config path is given explicitly.
pub const CONFIG_ENV_VAR: &str = "CHART_PIPELINE_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub defaults: Defaults,
    pub display: DisplayOptions,
    pub indicator_options: Vec<String>,
    pub tickers: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: Defaults::default(),
            display: DisplayOptions::default(),
            indicator_options: ["100 Day SMA", "30 Day SMA", "Linear Regression Line"]
                .map(String::from)
                .to_vec(),
            tickers: [
                "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "NFLX", "BABA", "AMD",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

/// Initial values for the comparison form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    pub primary: String,
    pub secondary: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            primary: "TSLA".into(),
            secondary: "AAPL".into(),
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 2, 2).unwrap_or_default(),
        }
    }
}

impl Defaults {
    pub fn range(&self) -> Result<DateRange, DateRangeError> {
        DateRange::new(self.start, self.end)
    }
}

impl AppConfig {
    /// Indicator options as engine requests.
    pub fn indicator_requests(&self) -> Vec<IndicatorRequest> {
        self.indicator_options.iter().map(|o| IndicatorRequest::new(o.as_str())).collect()
    }
}

/// Summary of changes performed during normalization.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ConfigReport {
    /// Tickers whose spelling changed when trimming/upper-casing.
    pub tickers_renamed: usize,
    /// Duplicate tickers removed after normalization.
    pub tickers_deduped: usize,
    /// Duplicate indicator options removed after trimming.
    pub indicator_options_deduped: usize,
}

fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Normalize a config in place.
///
/// Errors:
/// - empty ticker or default symbol after trimming
/// - an indicator option the engine does not support
/// - a default range whose start is not before its end
pub fn normalize_config(cfg: &mut AppConfig) -> anyhow::Result<ConfigReport> {
    let mut report = ConfigReport::default();

    let mut tickers = IndexSet::with_capacity(cfg.tickers.len());
    for raw in std::mem::take(&mut cfg.tickers) {
        let symbol = normalize_symbol(&raw);
        if symbol.is_empty() {
            bail!("ticker cannot be empty after trimming");
        }
        if symbol != raw {
            report.tickers_renamed += 1;
        }
        if !tickers.insert(symbol) {
            report.tickers_deduped += 1;
        }
    }
    cfg.tickers = tickers.into_iter().collect();

    let mut options = IndexSet::with_capacity(cfg.indicator_options.len());
    for raw in std::mem::take(&mut cfg.indicator_options) {
        let label = raw.trim().to_string();
        IndicatorRequest::new(label.as_str())
            .kind()
            .with_context(|| format!("indicator option '{label}' is not usable"))?;
        if !options.insert(label) {
            report.indicator_options_deduped += 1;
        }
    }
    cfg.indicator_options = options.into_iter().collect();

    for (name, symbol) in [
        ("defaults.primary", &mut cfg.defaults.primary),
        ("defaults.secondary", &mut cfg.defaults.secondary),
    ] {
        *symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            bail!("{name} cannot be empty after trimming");
        }
    }
    cfg.defaults.range().context("invalid default date range")?;

    Ok(report)
}

/// Parse and normalize a config from a TOML string.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<AppConfig> {
    let mut cfg: AppConfig = toml::from_str(toml_str).context("failed to parse config TOML")?;
    let report = normalize_config(&mut cfg).context("normalize_config failed")?;
    debug!(?report, "config normalized");
    Ok(cfg)
}

/// Read a config TOML file from disk, parse, and normalize it.
pub fn load_config_path(path: impl AsRef<Path>) -> anyhow::Result<AppConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}

/// The explicit path if given, otherwise [`CONFIG_ENV_VAR`] if set.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| get_env_var_opt(CONFIG_ENV_VAR).map(PathBuf::from))
}

/// Loads the resolved config file, or the defaults when no path is configured.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<AppConfig> {
    match resolve_config_path(explicit) {
        Some(path) => load_config_path(path),
        None => {
            let mut cfg = AppConfig::default();
            normalize_config(&mut cfg)?;
            Ok(cfg)
        }
    }
}
