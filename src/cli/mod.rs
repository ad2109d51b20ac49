//! Command-line parsing for the recession chart generator.
//!
//! Argument parsing and command dispatch are kept apart from the data and
//! rendering code; `crate::app` turns these structs into pipeline configs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::DateSpec;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rc", version, about = "Recession comparison charts from FRED data")]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// U.S. nonfarm employment normalized to its peak in each of the last 15 recessions.
    Usempl(UsemplArgs),
    /// Federal funds rates with recession periods shaded.
    Fedfunds(FedfundsArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Directory for cached series, reference CSVs and exported tables.
    #[arg(long, global = true, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory for rendered HTML charts.
    #[arg(long, global = true, default_value = "images")]
    pub images_dir: PathBuf,

    /// Log level (off, error, warn, info, debug, trace). `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Read the series from the local cache instead of downloading from FRED.
    #[arg(long, global = true)]
    pub from_cache: bool,

    /// Compute and cache the data but do not write the HTML chart.
    #[arg(long, global = true)]
    pub no_render: bool,

    /// Show the chart in the terminal after the run.
    #[arg(long, global = true)]
    pub preview: bool,
}

/// Options for the employment chart.
#[derive(Debug, Args, Clone)]
pub struct UsemplArgs {
    /// Months after the peak shown in the initial view.
    #[arg(long, default_value_t = 35)]
    pub frwd_mths_main: u32,

    /// Months before the peak shown in the initial view.
    #[arg(long, default_value_t = 4)]
    pub bkwd_mths_main: u32,

    /// Months after the peak kept in the data.
    #[arg(long, default_value_t = 135)]
    pub frwd_mths_max: u32,

    /// Months before the peak kept in the data.
    #[arg(long, default_value_t = 48)]
    pub bkwd_mths_max: u32,

    /// Last date of data (YYYY-MM-DD, `today` or `most_recent`).
    #[arg(long, default_value = "today")]
    pub end_date: DateSpec,
}

/// Options for the fed funds chart.
#[derive(Debug, Args, Clone)]
pub struct FedfundsArgs {
    /// First date shown (YYYY-MM-DD or `earliest`).
    #[arg(long, default_value = "earliest")]
    pub begin_date: DateSpec,

    /// Last date shown (YYYY-MM-DD, `today` or `most_recent`).
    #[arg(long, default_value = "today")]
    pub end_date: DateSpec,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usempl_defaults() {
        let cli = Cli::try_parse_from(["rc", "usempl"]).unwrap();
        let Command::Usempl(args) = cli.command else {
            panic!("expected usempl");
        };
        assert_eq!(
            (args.frwd_mths_main, args.bkwd_mths_main, args.frwd_mths_max, args.bkwd_mths_max),
            (35, 4, 135, 48)
        );
        assert_eq!(args.end_date, DateSpec::Today);
        assert_eq!(cli.common.data_dir, PathBuf::from("data"));
        assert!(!cli.common.from_cache);
    }

    #[test]
    fn fedfunds_dates_and_global_flags() {
        let cli = Cli::try_parse_from([
            "rc",
            "fedfunds",
            "--begin-date",
            "1990-01-01",
            "--end-date",
            "most_recent",
            "--from-cache",
            "--no-render",
        ])
        .unwrap();
        let Command::Fedfunds(args) = cli.command else {
            panic!("expected fedfunds");
        };
        assert_eq!(args.begin_date, DateSpec::On(chrono::NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()));
        assert_eq!(args.end_date, DateSpec::MostRecent);
        assert!(cli.common.from_cache && cli.common.no_render);
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(Cli::try_parse_from(["rc", "usempl", "--end-date", "yesterday"]).is_err());
    }
}
