use std::{env, fs, process};
use anyhow::{Context, Result};
use chrono::Local;
use log::{debug, error, info};
use crate::config::load_config;
use crate::cursor::StreamCursor;
use crate::errors::ExtractError;
use crate::extraction::{Extractor, Limits};
use crate::logging::setup_logger;
use crate::manager_smhi::{open_forecast_file, SMHI};
use crate::report::{assemble, ForecastReport};

mod aggregator;
mod calendar;
mod config;
mod cursor;
mod decoder;
mod errors;
mod extraction;
mod logging;
mod manager_smhi;
mod models;
mod report;
mod translate;

fn main() {
    let config_path = env::var("CONFIG_PATH").unwrap_or("config.toml".to_string());

    if let Err(e) = run(&config_path) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Loads configuration, opens the forecast stream and runs one extraction pass
///
/// # Arguments
///
/// * 'config_path' - path to the toml configuration file
fn run(config_path: &str) -> Result<()> {
    let config = load_config(config_path)
        .with_context(|| format!("loading {}", config_path))?;
    setup_logger(&config.general)?;

    info!("weatherglance version: {}", env!("CARGO_PKG_VERSION"));

    let reader = match &config.source.forecast_file {
        Some(path) => {
            info!("reading forecast from {}", path);
            open_forecast_file(path)?
        },
        None => {
            let smhi = SMHI::new(config.geo_ref.lat, config.geo_ref.long);
            info!("requesting forecast from {}", smhi.url());
            smhi.open_forecast()?
        },
    };

    let limits = Limits::default();
    let mut cursor = StreamCursor::new(reader).with_patience(limits.starve_retries, limits.starve_pause);
    let extractor = Extractor::new(limits);

    let ctx = match extractor.extract(&mut cursor, |stats| {
        debug!("{} entries processed, {} days collected", stats.entries, stats.days_collected);
    }) {
        Ok(ctx) => ctx,
        Err(ExtractError::StreamFormat(e)) => {
            print_msg(&format!("No data: {}", e), "Forecast");
            return Ok(());
        },
        Err(e) => return Err(e.into()),
    };

    let report = assemble(ctx);
    print_report(&report, "Forecast");

    if let Some(path) = &config.files.report_file {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("writing {}", path))?;
        info!("report written to {}", path);
    }

    Ok(())
}

/// Prints a report with a caption
///
/// # Arguments
///
/// * 'report' - the report to print
/// * 'caption' - the caption to print
fn print_report(report: &ForecastReport, caption: &str) {
    print_msg(&report.to_string(), caption);
}

/// Prints a message with a caption
///
/// # Arguments
///
/// * 'message' - the message
/// * 'caption' - the caption to print
fn print_msg(message: &str, caption: &str) {
    let report_time = format!("{}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    let caption = format!("{} {} ", report_time, caption);

    println!("{:=<100}\n{}\n", caption, message);
}
