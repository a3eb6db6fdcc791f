use std::io;
use thiserror::Error;

/// Errors that abort a whole extraction pass
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("ExtractError::StreamFormat: {0}")]
    StreamFormat(String),
    #[error("ExtractError::PassInProgress: an extraction pass is already running")]
    PassInProgress,
    #[error("ExtractError::Io: {0}")]
    Io(#[from] io::Error),
}

/// Classification of a single forecast entry that could not be used
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The object could not be parsed, counts against the error budget
    #[error("DecodeError::Malformed: {0}")]
    Malformed(String),
    /// The object parsed but lacks a usable timestamp, does not count against the budget
    #[error("DecodeError::Unusable: {0}")]
    Unusable(String),
    /// The stream ended, or stayed starved, before a complete object could be read
    #[error("DecodeError::Exhausted")]
    Exhausted,
    #[error("DecodeError::Io: {0}")]
    Io(#[from] io::Error),
}
impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_eof() {
            return DecodeError::Exhausted;
        }
        if e.is_io() {
            let e = io::Error::from(e);
            return match e.kind() {
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => DecodeError::Exhausted,
                _ => DecodeError::Io(e),
            };
        }
        DecodeError::Malformed(e.to_string())
    }
}

#[derive(Error, Debug)]
#[error("ConfigError: {0}")]
pub struct ConfigError(pub String);
impl From<&str> for ConfigError {
    fn from(e: &str) -> Self { ConfigError(e.to_string()) }
}
impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self { ConfigError(e.to_string()) }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self { ConfigError(e.to_string()) }
}

#[derive(Error, Debug)]
#[error("LoggingError: {0}")]
pub struct LoggingError(pub String);
impl From<io::Error> for LoggingError {
    fn from(e: io::Error) -> Self { LoggingError(e.to_string()) }
}
impl From<log4rs::config::runtime::ConfigErrors> for LoggingError {
    fn from(e: log4rs::config::runtime::ConfigErrors) -> Self { LoggingError(e.to_string()) }
}
impl From<log::SetLoggerError> for LoggingError {
    fn from(e: log::SetLoggerError) -> Self { LoggingError(e.to_string()) }
}
