use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use crate::config::General;
use crate::errors::LoggingError;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {h({l:<5})} {t} - {m}{n}";

/// Sets up log4rs given the general section of the configuration.
///
/// Logs go to the log file when a path is given, and to stdout when asked for.
///
/// # Arguments
///
/// * 'general' - logging parameters
pub fn setup_logger(general: &General) -> Result<(), LoggingError> {
    let config = build_config(general)?;
    log4rs::init_config(config)?;

    Ok(())
}

fn build_config(general: &General) -> Result<Config, LoggingError> {
    let mut builder = Config::builder();
    let mut root = Root::builder();

    if !general.log_path.is_empty() {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(PATTERN)))
            .build(&general.log_path)?;
        builder = builder.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
    }

    if general.log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    Ok(builder.build(root.build(general.log_level))?)
}
