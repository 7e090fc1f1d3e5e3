//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the pipeline stages
//! - exported to CSV
//! - rendered by every presentation surface (report, SVG, TUI)

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// BCB SGS code for IPCA monthly variation (%).
pub const IPCA_SERIES_CODE: u32 = 433;

/// Default forecast horizon in months.
pub const DEFAULT_HORIZON: usize = 6;

/// Default two-sided confidence level for forecast bounds.
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// A calendar month.
///
/// Field order matters: the derived `Ord` compares year first, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Default window start: excludes the 1980s-90s hyperinflation.
    pub const DEFAULT_START: YearMonth = YearMonth { year: 2000, month: 1 };

    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    /// First day of the month, if representable by chrono.
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn succ(self) -> Self {
        self.add_months(1)
    }

    pub fn pred(self) -> Self {
        self.add_months(-1)
    }

    pub fn add_months(self, delta: i64) -> Self {
        let index = self.index() + delta;
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Signed number of months from `earlier` to `self`.
    pub fn months_since(self, earlier: YearMonth) -> i64 {
        self.index() - earlier.index()
    }

    /// Position on a continuous time axis (`2000-01` -> `2000.0`, `2000-07` -> `2000.5`).
    pub fn as_year_fraction(self) -> f64 {
        self.year as f64 + (self.month as f64 - 1.0) / 12.0
    }

    fn index(self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = AppError;

    /// Accepts `YYYY-MM` or a full `YYYY-MM-DD` date (the day is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::from_date(date));
        }
        let invalid = || AppError::config(format!("Invalid month '{s}'. Expected YYYY-MM or YYYY-MM-DD."));
        let (y, m) = s.split_once('-').ok_or_else(invalid)?;
        let year = y.parse::<i32>().map_err(|_| invalid())?;
        let month = m.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

/// One monthly IPCA reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: YearMonth,
    /// Percentage change relative to the prior month (e.g. `0.56` for 0.56%).
    pub monthly_variation_pct: f64,
}

impl Observation {
    pub fn new(date: YearMonth, monthly_variation_pct: f64) -> Self {
        Self {
            date,
            monthly_variation_pct,
        }
    }
}

/// A chronologically ordered, duplicate-free sequence of observations.
///
/// Construction enforces strictly increasing months; a `Series` is never
/// mutated after it is built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    observations: Vec<Observation>,
}

impl Series {
    pub fn new(observations: Vec<Observation>) -> Result<Self, AppError> {
        for pair in observations.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(AppError::parse(format!(
                    "Series months must be strictly increasing ({} followed by {}).",
                    pair[0].date, pair[1].date
                )));
            }
        }
        Ok(Self { observations })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.monthly_variation_pct).collect()
    }

    /// Calendar months missing between the first and last observation.
    pub fn gaps(&self) -> Vec<YearMonth> {
        let mut out = Vec::new();
        for pair in self.observations.windows(2) {
            let mut m = pair[0].date.succ();
            while m < pair[1].date {
                out.push(m);
                m = m.succ();
            }
        }
        out
    }

    /// Build from a sub-slice of an existing series (already ordered).
    pub(crate) fn from_ordered(observations: &[Observation]) -> Self {
        Self {
            observations: observations.to_vec(),
        }
    }
}

/// One point of a running compounded product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub date: YearMonth,
    /// Compounded inflation from the window start through `date`, in percent.
    pub cumulative_pct: f64,
}

/// Running compounded inflation over a window.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CumulativeSeries {
    pub points: Vec<CumulativePoint>,
}

impl CumulativeSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Compounded inflation over the whole window, `None` when empty.
    pub fn total_pct(&self) -> Option<f64> {
        self.points.last().map(|p| p.cumulative_pct)
    }

    pub fn start(&self) -> Option<YearMonth> {
        self.points.first().map(|p| p.date)
    }

    pub fn end(&self) -> Option<YearMonth> {
        self.points.last().map(|p| p.date)
    }
}

/// Autoregressive-integrated model order `(p, d, q)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ModelOrder {
    pub const DEFAULT: ModelOrder = ModelOrder { p: 5, d: 1, q: 0 };

    pub const MAX_P: usize = 12;
    pub const MAX_D: usize = 2;
}

impl Default for ModelOrder {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ModelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

impl FromStr for ModelOrder {
    type Err = AppError;

    /// Parses `p,d,q` (parentheses and spaces are tolerated).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s.chars().filter(|c| !c.is_whitespace() && *c != '(' && *c != ')').collect();
        let parts: Vec<&str> = cleaned.split(',').collect();
        let invalid = || AppError::config(format!("Invalid model order '{s}'. Expected p,d,q (e.g. 5,1,0)."));
        if parts.len() != 3 {
            return Err(invalid());
        }
        let nums = parts
            .iter()
            .map(|p| p.parse::<usize>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            p: nums[0],
            d: nums[1],
            q: nums[2],
        })
    }
}

/// Forecast output with interval bounds.
///
/// All per-step vectors share the same length (the horizon), and
/// `lower_bound[i] <= point_forecast[i] <= upper_bound[i]` for every step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub dates: Vec<YearMonth>,
    pub point_forecast: Vec<f64>,
    pub lower_bound: Vec<f64>,
    pub upper_bound: Vec<f64>,
    pub confidence_level: f64,
    pub order: ModelOrder,
    pub ar_coefficients: Vec<f64>,
    /// Constant term (only estimated when `d == 0`).
    pub intercept: f64,
    /// Innovation variance of the fitted model.
    pub sigma2: f64,
    /// Observations the model was fitted on.
    pub n_obs: usize,
}

impl ForecastResult {
    pub fn horizon(&self) -> usize {
        self.point_forecast.len()
    }

    /// Mean of the point forecasts (the "next semester" headline).
    pub fn mean_point(&self) -> Option<f64> {
        if self.point_forecast.is_empty() {
            return None;
        }
        Some(self.point_forecast.iter().sum::<f64>() / self.point_forecast.len() as f64)
    }
}

/// Which data source feeds the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Banco Central do Brasil SGS API (network).
    Bcb,
    /// Local CSV or JSON export of the series.
    File,
    /// Seeded synthetic series for offline demos.
    Synthetic,
}

/// Which observations the forecaster is fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ForecastScope {
    /// The filtered window.
    Window,
    /// The whole cleaned series.
    Full,
}

/// Display-only aggregation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Monthly,
    Annual,
}

impl Granularity {
    pub fn toggle(self) -> Self {
        match self {
            Granularity::Monthly => Granularity::Annual,
            Granularity::Annual => Granularity::Monthly,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Granularity::Monthly => "monthly",
            Granularity::Annual => "annual",
        }
    }
}

/// Inclusive month range; `None` on either side means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<YearMonth>,
    pub end: Option<YearMonth>,
}

impl DateRange {
    pub fn contains(&self, m: YearMonth) -> bool {
        self.start.is_none_or(|s| m >= s) && self.end.is_none_or(|e| m <= e)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Presenter options. These never change computed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub date_range: DateRange,
    pub show_confidence_band: bool,
    pub granularity: Granularity,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            date_range: DateRange::default(),
            show_confidence_band: true,
            granularity: Granularity::Monthly,
        }
    }
}

/// Analysis window: `start <= date <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    pub start: YearMonth,
    pub end: Option<YearMonth>,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            start: YearMonth::DEFAULT_START,
            end: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastConfig {
    pub enabled: bool,
    pub horizon: usize,
    pub confidence_level: f64,
    pub order: ModelOrder,
    pub scope: ForecastScope,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            horizon: DEFAULT_HORIZON,
            confidence_level: DEFAULT_CONFIDENCE,
            order: ModelOrder::DEFAULT,
            scope: ForecastScope::Window,
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.horizon == 0 {
            return Err(AppError::config("Forecast horizon must be > 0."));
        }
        if !(self.confidence_level.is_finite() && self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(AppError::config(format!(
                "Confidence level must be in (0, 1), got {}.",
                self.confidence_level
            )));
        }
        if self.order.q > 0 {
            return Err(AppError::config(format!(
                "Model order {}: moving-average terms are not supported (q must be 0).",
                self.order
            )));
        }
        if self.order.p > ModelOrder::MAX_P {
            return Err(AppError::config(format!("AR order must be <= {}.", ModelOrder::MAX_P)));
        }
        if self.order.d > ModelOrder::MAX_D {
            return Err(AppError::config(format!(
                "Differencing order must be <= {}.",
                ModelOrder::MAX_D
            )));
        }
        Ok(())
    }
}

/// A full session's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and `.env`).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub source: SourceKind,
    pub input_path: Option<PathBuf>,
    pub series_code: u32,
    pub seed: u64,

    pub window: WindowSpec,
    pub forecast: ForecastConfig,
    pub display: DisplayOptions,

    pub plot_width: usize,
    pub plot_height: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Bcb,
            input_path: None,
            series_code: IPCA_SERIES_CODE,
            seed: 42,
            window: WindowSpec::default(),
            forecast: ForecastConfig::default(),
            display: DisplayOptions::default(),
            plot_width: 100,
            plot_height: 20,
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.source == SourceKind::File && self.input_path.is_none() {
            return Err(AppError::config("`--source file` requires `--input <PATH>`."));
        }
        if let Some(end) = self.window.end.filter(|e| *e < self.window.start) {
            return Err(AppError::config(format!(
                "Window end {end} precedes start {}.",
                self.window.start
            )));
        }
        if let (Some(s), Some(e)) = (self.display.date_range.start, self.display.date_range.end) {
            if e < s {
                return Err(AppError::config(format!("Display range end {e} precedes start {s}.")));
            }
        }
        self.forecast.validate()
    }
}
