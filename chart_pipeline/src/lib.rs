//! Data-to-chart pipeline for comparing two instruments.
//!
//! Raw vendor tables are normalized into [`BarSeries`](models::bar_series::BarSeries),
//! classified bar by bar, decorated with indicator overlays, and assembled into
//! renderer-agnostic [`ChartSpec`](chart::ChartSpec)s. [`pipeline::render_comparison`]
//! runs the whole flow for a pair of symbols with a shared horizontal axis.

#[cfg(feature = "cli")]
pub mod cli;
pub mod chart;
pub mod classify;
pub mod config;
pub mod indicators;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod providers;
