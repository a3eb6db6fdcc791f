use std::fs;
use log::LevelFilter;
use serde::Deserialize;
use crate::errors::ConfigError;

#[derive(Deserialize, Debug)]
pub struct GeoRef {
    pub lat: f64,
    pub long: f64,
}

#[derive(Deserialize, Debug, Default)]
pub struct Source {
    /// Saved SMHI document to read instead of calling the forecast api
    pub forecast_file: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Files {
    /// Where to write the report as json, if anywhere
    pub report_file: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub geo_ref: GeoRef,
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub files: Files,
    pub general: General,
}

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {

    let toml = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&toml)?;

    if !(-90.0..=90.0).contains(&config.geo_ref.lat) || !(-180.0..=180.0).contains(&config.geo_ref.long) {
        return Err(ConfigError::from("geo_ref lat/long out of range"));
    }

    if !config.general.log_to_stdout && config.general.log_path.is_empty() {
        return Err(ConfigError::from("no log_path given and log_to_stdout is false"));
    }

    Ok(config)
}
