//! Command-line parsing for the IPCA dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the analysis code. Flags are turned into a validated
//! `DashboardConfig` in `app::config_from_args`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::{
    DEFAULT_CONFIDENCE, DEFAULT_HORIZON, ForecastScope, Granularity, IPCA_SERIES_CODE, ModelOrder, SourceKind,
    YearMonth,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ipca", version, about = "Brazilian IPCA inflation dashboard (BCB SGS)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print indicators, cleaning diagnostics, an ASCII chart and the forecast.
    Summary(DashboardArgs),
    /// Print one table (series, cumulative or forecast).
    Table(TableArgs),
    /// Write SVG figures and CSV tables to a directory.
    Export(ExportArgs),
    /// Launch the interactive dashboard.
    ///
    /// This uses the same pipeline as `ipca summary`, but renders results in a
    /// terminal UI using Ratatui.
    Tui(DashboardArgs),
}

/// Options shared by every command.
#[derive(Debug, Parser, Clone)]
pub struct DashboardArgs {
    /// Where the series comes from.
    #[arg(long, value_enum, default_value_t = SourceKind::Bcb)]
    pub source: SourceKind,

    /// CSV or JSON file (with `--source file`).
    #[arg(short = 'i', long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// SGS series code.
    #[arg(long, default_value_t = IPCA_SERIES_CODE)]
    pub series_code: u32,

    /// Random seed for the synthetic source.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First month of the analysis window (YYYY-MM or YYYY-MM-DD).
    #[arg(short = 's', long, default_value_t = YearMonth::DEFAULT_START)]
    pub start: YearMonth,

    /// Last month of the analysis window (defaults to the latest observation).
    #[arg(short = 'e', long)]
    pub end: Option<YearMonth>,

    /// Forecast horizon in months.
    #[arg(long, default_value_t = DEFAULT_HORIZON)]
    pub horizon: usize,

    /// Confidence level of the forecast interval (0..1).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    pub confidence: f64,

    /// ARIMA order as `p,d,q` (q must be 0).
    #[arg(long, default_value_t = ModelOrder::DEFAULT)]
    pub order: ModelOrder,

    /// Fit the forecast on the window or on the full series.
    #[arg(long, value_enum, default_value_t = ForecastScope::Window)]
    pub forecast_on: ForecastScope,

    /// Skip forecasting.
    #[arg(long)]
    pub no_forecast: bool,

    /// Display aggregation.
    #[arg(short = 'g', long, value_enum, default_value_t = Granularity::Monthly)]
    pub granularity: Granularity,

    /// First month shown on charts and tables.
    #[arg(long)]
    pub range_start: Option<YearMonth>,

    /// Last month shown on charts and tables.
    #[arg(long)]
    pub range_end: Option<YearMonth>,

    /// Hide the forecast confidence band.
    #[arg(long)]
    pub no_band: bool,

    /// ASCII chart width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// ASCII chart height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Which table `ipca table` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableView {
    Series,
    Cumulative,
    Forecast,
}

#[derive(Debug, Parser, Clone)]
pub struct TableArgs {
    #[command(flatten)]
    pub common: DashboardArgs,

    #[arg(long, value_enum, default_value_t = TableView::Series)]
    pub view: TableView,
}

#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub common: DashboardArgs,

    /// Output directory (created if missing).
    #[arg(short = 'o', long, value_name = "DIR", default_value = "ipca-out")]
    pub out_dir: PathBuf,
}
