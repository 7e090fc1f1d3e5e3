//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments into a validated `DashboardConfig`
//! - sets up logging
//! - runs the pipeline and prints reports, tables and charts
//! - writes exports

use std::path::Path;

use clap::Parser;

use crate::app::pipeline::RunOutput;
use crate::cli::{Command, DashboardArgs, ExportArgs, TableArgs, TableView};
use crate::domain::{DashboardConfig, DateRange, DisplayOptions, ForecastConfig, WindowSpec};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `ipca` binary.
pub fn run() -> Result<(), AppError> {
    // We want `ipca` and `ipca --start 2015-01` to behave like `ipca tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Summary(args) => {
            init_logging("info");
            handle_summary(&config_from_args(&args)?)
        }
        Command::Table(args) => {
            init_logging("info");
            handle_table(&args)
        }
        Command::Export(args) => {
            init_logging("info");
            handle_export(&args)
        }
        Command::Tui(args) => {
            // Log lines on stderr would tear the alternate screen.
            init_logging("off");
            crate::tui::run(config_from_args(&args)?)
        }
    }
}

/// `RUST_LOG` wins over `default_level`.
fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .try_init()
        .ok();
}

fn handle_summary(config: &DashboardConfig) -> Result<(), AppError> {
    let run = pipeline::run(config)?;
    print!("{}", summary_text(config, &run));
    Ok(())
}

/// Full terminal summary. Failed stages render as "no data" blocks.
pub fn summary_text(config: &DashboardConfig, run: &RunOutput) -> String {
    use crate::plot::render_ascii_chart;
    use crate::present::{cumulative_chart, forecast_chart, series_chart};
    use crate::report::{
        format_clean_report, format_forecast_headline, format_forecast_table, format_header, format_kpis, format_no_data,
    };

    let (w, h) = (config.plot_width, config.plot_height);
    let source = crate::data::source_label(config);
    let mut out = String::new();

    out.push_str(&format_header(&source, &run.data.series, &run.window, &config.window));
    out.push_str(&format_clean_report(&run.data.report));

    match &run.kpis {
        Some(k) => out.push_str(&format_kpis(k)),
        None => out.push_str(&format_no_data("\nIndicators", &window_error(run))),
    }
    out.push('\n');

    match series_chart(&run.window, &config.display) {
        Ok(chart) => out.push_str(&render_ascii_chart(&chart, w, h)),
        Err(err) => out.push_str(&format_no_data("IPCA monthly variation", &err)),
    }
    out.push('\n');

    match run.cumulative.clone().and_then(|c| cumulative_chart(&c, &config.display)) {
        Ok(chart) => out.push_str(&render_ascii_chart(&chart, w, h)),
        Err(err) => out.push_str(&format_no_data("Cumulative IPCA", &err)),
    }

    match &run.forecast {
        None => {}
        Some(Err(err)) => {
            out.push('\n');
            out.push_str(&format_no_data("Forecast", err));
        }
        Some(Ok(f)) => {
            out.push('\n');
            out.push_str(&format_forecast_headline(f));
            out.push_str(&format_forecast_table(f));
            out.push('\n');
            match forecast_chart(run.forecast_input(config), f, &config.display) {
                Ok(chart) => out.push_str(&render_ascii_chart(&chart, w, h)),
                Err(err) => out.push_str(&format_no_data("Forecast", &err)),
            }
        }
    }

    out
}

fn handle_table(args: &TableArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.common)?;
    let run = pipeline::run(&config)?;
    println!("{}", table_text(&config, &run, args.view)?);
    Ok(())
}

/// One table. Unlike the summary, a failed stage is returned as the command's error.
pub fn table_text(config: &DashboardConfig, run: &RunOutput, view: TableView) -> Result<String, AppError> {
    use crate::report::{format_cumulative_table, format_forecast_table, format_series_table};

    match view {
        TableView::Series => {
            if run.window.is_empty() {
                return Err(window_error(run));
            }
            Ok(format_series_table(&run.window, &config.display))
        }
        TableView::Cumulative => {
            let cumulative = run.cumulative.as_ref().map_err(Clone::clone)?;
            Ok(format_cumulative_table(cumulative, &config.display))
        }
        TableView::Forecast => match &run.forecast {
            Some(result) => Ok(format_forecast_table(result.as_ref().map_err(Clone::clone)?)),
            None => Err(AppError::config("Forecasting is disabled (`--no-forecast`).")),
        },
    }
}

fn handle_export(args: &ExportArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.common)?;
    let run = pipeline::run(&config)?;
    let written = export_all(&config, &run, &args.out_dir)?;
    for path in written {
        println!("wrote {path}");
    }
    Ok(())
}

/// Write CSV tables and SVG figures for every stage that succeeded.
///
/// Returns the written paths. Failed stages are skipped with a warning.
pub fn export_all(config: &DashboardConfig, run: &RunOutput, out_dir: &Path) -> Result<Vec<String>, AppError> {
    use crate::io::export::{write_cumulative_csv, write_forecast_csv, write_series_csv};
    use crate::plot::{FIGURE_SIZE, write_chart_svg};
    use crate::present::{cumulative_chart, forecast_chart, series_chart};

    std::fs::create_dir_all(out_dir)
        .map_err(|e| AppError::io(format!("Failed to create '{}': {e}", out_dir.display())))?;

    let mut written = Vec::new();
    let mut record = |name: &str| written.push(out_dir.join(name).display().to_string());

    if run.window.is_empty() {
        log::warn!("skipping series export: {}", window_error(run));
    } else {
        write_series_csv(&out_dir.join("series.csv"), &run.window)?;
        record("series.csv");
        match series_chart(&run.window, &config.display) {
            Ok(chart) => {
                write_chart_svg(&out_dir.join("series.svg"), &chart, FIGURE_SIZE)?;
                record("series.svg");
            }
            Err(err) => log::warn!("skipping series figure: {err}"),
        }
    }

    match &run.cumulative {
        Ok(cumulative) => {
            write_cumulative_csv(&out_dir.join("cumulative.csv"), cumulative)?;
            record("cumulative.csv");
            match cumulative_chart(cumulative, &config.display) {
                Ok(chart) => {
                    write_chart_svg(&out_dir.join("cumulative.svg"), &chart, FIGURE_SIZE)?;
                    record("cumulative.svg");
                }
                Err(err) => log::warn!("skipping cumulative figure: {err}"),
            }
        }
        Err(err) => log::warn!("skipping cumulative export: {err}"),
    }

    match &run.forecast {
        Some(Ok(f)) => {
            write_forecast_csv(&out_dir.join("forecast.csv"), f)?;
            record("forecast.csv");
            match forecast_chart(run.forecast_input(config), f, &config.display) {
                Ok(chart) => {
                    write_chart_svg(&out_dir.join("forecast.svg"), &chart, FIGURE_SIZE)?;
                    record("forecast.svg");
                }
                Err(err) => log::warn!("skipping forecast figure: {err}"),
            }
        }
        Some(Err(err)) => log::warn!("skipping forecast export: {err}"),
        None => {}
    }

    Ok(written)
}

fn window_error(run: &RunOutput) -> AppError {
    match &run.cumulative {
        Err(err) => err.clone(),
        Ok(_) => AppError::window_empty("The selected window has no observations."),
    }
}

/// Build and validate the run configuration from CLI flags.
pub fn config_from_args(args: &DashboardArgs) -> Result<DashboardConfig, AppError> {
    let config = DashboardConfig {
        source: args.source,
        input_path: args.input.clone(),
        series_code: args.series_code,
        seed: args.seed,
        window: WindowSpec {
            start: args.start,
            end: args.end,
        },
        forecast: ForecastConfig {
            enabled: !args.no_forecast,
            horizon: args.horizon,
            confidence_level: args.confidence,
            order: args.order,
            scope: args.forecast_on,
        },
        display: DisplayOptions {
            date_range: DateRange {
                start: args.range_start,
                end: args.range_end,
            },
            show_confidence_band: !args.no_band,
            granularity: args.granularity,
        },
        plot_width: args.width,
        plot_height: args.height,
    };
    config.validate()?;
    Ok(config)
}

/// Rewrite argv so `ipca` defaults to `ipca tui`.
///
/// Rules:
/// - `ipca`                      -> `ipca tui`
/// - `ipca --start 2015-01 ...`  -> `ipca tui --start 2015-01 ...`
/// - `ipca --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "summary" | "table" | "export" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::clean::{CleanOutput, CleanReport};
    use crate::data::sample::synthetic_series;
    use crate::domain::{SourceKind, YearMonth};
    use crate::error::ErrorKind;

    fn args(extra: &[&str]) -> DashboardArgs {
        let mut argv = vec!["ipca", "summary", "--source", "synthetic"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Command::Summary(a) => a,
            _ => unreachable!(),
        }
    }

    fn synthetic_run(config: &DashboardConfig) -> RunOutput {
        let series = synthetic_series(1995, 1, 360, config.seed).unwrap();
        let data = CleanOutput {
            report: CleanReport {
                rows_read: series.len(),
                rows_kept: series.len(),
                ..CleanReport::default()
            },
            series,
        };
        pipeline::run_with_data(config, data)
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_and_flags_default_to_tui() {
        assert_eq!(rewrite_args(strings(&["ipca"])), strings(&["ipca", "tui"]));
        assert_eq!(
            rewrite_args(strings(&["ipca", "--start", "2015-01"])),
            strings(&["ipca", "tui", "--start", "2015-01"])
        );
        assert_eq!(rewrite_args(strings(&["ipca", "summary"])), strings(&["ipca", "summary"]));
        assert_eq!(rewrite_args(strings(&["ipca", "--help"])), strings(&["ipca", "--help"]));
    }

    #[test]
    fn config_from_args_maps_and_validates() {
        let cfg = config_from_args(&args(&["--no-band", "--horizon", "12", "--start", "2010-01"])).unwrap();
        assert_eq!(cfg.source, SourceKind::Synthetic);
        assert_eq!(cfg.forecast.horizon, 12);
        assert!(!cfg.display.show_confidence_band);
        assert_eq!(cfg.window.start, YearMonth::new(2010, 1).unwrap());

        let err = config_from_args(&args(&["--confidence", "1.5"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        let err = config_from_args(&args(&["--order", "1,1,1"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        let mut file_without_input = args(&[]);
        file_without_input.source = SourceKind::File;
        let err = config_from_args(&file_without_input).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        // Repeating a flag is a parse error, not a process exit.
        assert!(Cli::try_parse_from(["ipca", "summary", "--source", "bcb", "--source", "file"]).is_err());
    }

    #[test]
    fn summary_contains_every_section() {
        let cfg = config_from_args(&args(&["--width", "60", "--height", "10"])).unwrap();
        let text = summary_text(&cfg, &synthetic_run(&cfg));
        assert!(text.contains("Source: synthetic (seed 42)"));
        assert!(text.contains("Indicators (2000-01 .. 2024-12, 300 month(s))"));
        assert!(text.contains("Cumulative IPCA since 2000-01"));
        assert!(text.contains("Average projected monthly inflation over the next 6 month(s)"));
        assert!(text.contains("legend:"));
    }

    #[test]
    fn empty_window_renders_no_data_and_fails_tables() {
        let cfg = config_from_args(&args(&["--start", "2040-01"])).unwrap();
        let run = synthetic_run(&cfg);
        let text = summary_text(&cfg, &run);
        assert!(text.contains("Cumulative IPCA: no data (empty window: No observations on or after 2040-01.)"));

        let err = table_text(&cfg, &run, TableView::Cumulative).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WindowEmpty);
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn export_writes_tables_and_figures() {
        let cfg = config_from_args(&args(&[])).unwrap();
        let run = synthetic_run(&cfg);
        let dir = std::env::temp_dir().join(format!("ipca_export_all_{}", std::process::id()));
        let written = export_all(&cfg, &run, &dir).unwrap();
        assert_eq!(written.len(), 6);
        assert!(dir.join("forecast.svg").exists());
        std::fs::remove_dir_all(dir).ok();
    }
}
