//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that parses the
//! CLI, starts logging, runs a pipeline, prints the summary, writes the HTML
//! chart and optionally opens the terminal preview.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Parser;

use crate::cli::{Cli, Command, CommonArgs, FedfundsArgs, UsemplArgs};
use crate::data::{FredClient, SeriesSource};
use crate::domain::DATE_FORMAT;
use crate::error::AppError;
use crate::render::{ChartSpec, MonthWindows, employment_chart, fedfunds_chart, write_html};

pub mod pipeline;

use pipeline::{EmploymentConfig, FedFundsConfig};

/// Entry point for the `rc` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    crate::logging::init_logging(&cli.common.log_level)?;

    match cli.command {
        Command::Usempl(args) => handle_usempl(&cli.common, &args),
        Command::Fedfunds(args) => handle_fedfunds(&cli.common, &args),
    }
}

fn handle_usempl(common: &CommonArgs, args: &UsemplArgs) -> Result<(), AppError> {
    let config = employment_config(common, args);
    let client = fred_client(common)?;
    let run = pipeline::run_employment(&config, client.as_ref().map(|c| c as &dyn SeriesSource))?;

    println!("{}", crate::report::format_employment_summary(&run));

    let months = MonthWindows {
        frwd_main: args.frwd_mths_main,
        bkwd_main: args.bkwd_mths_main,
        frwd_max: args.frwd_mths_max,
        bkwd_max: args.bkwd_mths_max,
    };
    let spec = employment_chart(&run, months, today());
    finish(common, &spec, &artifact_path(&common.images_dir, "usempl_npp", run.end_date))
}

fn handle_fedfunds(common: &CommonArgs, args: &FedfundsArgs) -> Result<(), AppError> {
    let config = fedfunds_config(common, args);
    let client = fred_client(common)?;
    let run = pipeline::run_fedfunds(&config, client.as_ref().map(|c| c as &dyn SeriesSource))?;

    println!("{}", crate::report::format_fedfunds_summary(&run));

    let spec = fedfunds_chart(&run, today());
    finish(common, &spec, &artifact_path(&common.images_dir, "fedfunds", run.end_date))
}

/// Write the artifact (unless `--no-render`) and open the preview if asked.
fn finish(common: &CommonArgs, spec: &ChartSpec, path: &Path) -> Result<(), AppError> {
    if common.no_render {
        log::info!("--no-render set, skipping {}", path.display());
    } else {
        pipeline::ensure_dir(&common.images_dir)?;
        write_html(path, spec)?;
        println!("Chart: {}", path.display());
    }

    if common.preview {
        crate::tui::preview(spec)?;
    }
    Ok(())
}

/// The FRED client is only needed (and the API key only required) when downloading.
fn fred_client(common: &CommonArgs) -> Result<Option<FredClient>, AppError> {
    if common.from_cache {
        Ok(None)
    } else {
        FredClient::from_env().map(Some)
    }
}

pub fn employment_config(common: &CommonArgs, args: &UsemplArgs) -> EmploymentConfig {
    EmploymentConfig {
        frwd_mths_main: args.frwd_mths_main,
        bkwd_mths_main: args.bkwd_mths_main,
        frwd_mths_max: args.frwd_mths_max,
        bkwd_mths_max: args.bkwd_mths_max,
        end: args.end_date,
        download: !common.from_cache,
        data_dir: common.data_dir.clone(),
    }
}

pub fn fedfunds_config(common: &CommonArgs, args: &FedfundsArgs) -> FedFundsConfig {
    FedFundsConfig {
        begin: args.begin_date,
        end: args.end_date,
        download: !common.from_cache,
        data_dir: common.data_dir.clone(),
    }
}

/// `<images-dir>/<stem>_<YYYY-MM-DD>.html`
pub fn artifact_path(dir: &Path, stem: &str, end: NaiveDate) -> PathBuf {
    dir.join(format!("{stem}_{}.html", end.format(DATE_FORMAT)))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
