//! Program logging.
//!
//! Messages go to the console (warnings and errors on stderr, everything else on stdout) and, once
//! an output folder exists, to a pair of log files inside it. The level is taken from the
//! `SOLAR_SIZING_LOG_LEVEL` environment variable, then from `settings.toml`, then
//! [`DEFAULT_LOG_LEVEL`].
use anyhow::{Context, Result, bail};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record};
use std::env;
use std::fmt::{Arguments, Display};
use std::fs::File;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::OnceLock;

/// Set once the logger has been installed
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// The environment variable which overrides the log level from the settings file
const LOG_LEVEL_ENV_VAR: &str = "SOLAR_SIZING_LOG_LEVEL";

/// The log level used if neither the environment nor the settings file give one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log file for progress messages
const LOG_INFO_FILE_NAME: &str = "solar_sizing_info.log";

/// Log file for warnings and errors
const LOG_ERROR_FILE_NAME: &str = "solar_sizing_error.log";

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Initialise the program logger.
///
/// Only the first call has any effect, so a single process can size several models.
///
/// # Arguments
///
/// * `log_level_from_settings`: The log level given in `settings.toml`, one of `off`, `error`,
///   `warn`, `info`, `debug` or `trace`
/// * `output_dir`: If given, the folder in which to write log files
pub fn init(log_level_from_settings: Option<&str>, output_dir: Option<&Path>) -> Result<()> {
    if is_logger_initialised() {
        return Ok(());
    }

    let log_level = match env::var(LOG_LEVEL_ENV_VAR) {
        Ok(level) => parse_log_level(&level)
            .with_context(|| format!("Invalid value for {LOG_LEVEL_ENV_VAR}"))?,
        Err(_) => parse_log_level(log_level_from_settings.unwrap_or(DEFAULT_LOG_LEVEL))?,
    };

    let mut dispatch = Dispatch::new().chain(console_dispatch(log_level));
    if let Some(output_dir) = output_dir {
        dispatch = dispatch.chain(file_dispatch(output_dir, log_level)?);
    }
    dispatch.apply().context("Logger already initialised")?;

    let _ = LOGGER_INIT.set(());

    Ok(())
}

/// Convert a log level string (case insensitive) to a [`LevelFilter`]
fn parse_log_level(log_level: &str) -> Result<LevelFilter> {
    let level = match log_level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        unknown => bail!("Unknown log level: {unknown}"),
    };

    Ok(level)
}

/// Whether a record belongs in the error stream rather than the progress stream
fn is_problem(record: &log::Metadata) -> bool {
    record.level() <= LevelFilter::Warn
}

/// Console output, coloured when writing to a terminal
fn console_dispatch(log_level: LevelFilter) -> Dispatch {
    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);
    let stdout_colours = std::io::stdout().is_terminal().then_some(colours);
    let stderr_colours = std::io::stderr().is_terminal().then_some(colours);

    Dispatch::new()
        .chain(
            Dispatch::new()
                .filter(|metadata| !is_problem(metadata))
                .format(move |out, message, record| {
                    format_coloured(out, message, record, stdout_colours.as_ref());
                })
                .level(log_level)
                .chain(std::io::stdout()),
        )
        .chain(
            Dispatch::new()
                .format(move |out, message, record| {
                    format_coloured(out, message, record, stderr_colours.as_ref());
                })
                .level(log_level.min(LevelFilter::Warn))
                .chain(std::io::stderr()),
        )
}

/// Log files in the output folder.
///
/// Progress is always recorded at `info` or finer, so that a run is documented even when the
/// console is quiet. Warnings and errors are always recorded.
fn file_dispatch(output_dir: &Path, log_level: LevelFilter) -> Result<Dispatch> {
    let create = |file_name: &str| {
        let path = output_dir.join(file_name);
        File::create(&path).with_context(|| format!("Could not create {}", path.display()))
    };

    Ok(Dispatch::new()
        .chain(
            Dispatch::new()
                .filter(|metadata| !is_problem(metadata))
                .format(format_plain)
                .level(log_level.max(LevelFilter::Info))
                .chain(create(LOG_INFO_FILE_NAME)?),
        )
        .chain(
            Dispatch::new()
                .format(format_plain)
                .level(LevelFilter::Warn)
                .chain(create(LOG_ERROR_FILE_NAME)?),
        ))
}

fn format_line<T: Display>(out: FormatCallback, level: T, record: &Record, message: &Arguments) {
    let timestamp = Local::now().format("%H:%M:%S");
    out.finish(format_args!(
        "[{timestamp} {level}] {}: {message}",
        record.target()
    ));
}

fn format_plain(out: FormatCallback, message: &Arguments, record: &Record) {
    format_line(out, record.level(), record, message);
}

fn format_coloured(
    out: FormatCallback,
    message: &Arguments,
    record: &Record,
    colours: Option<&ColoredLevelConfig>,
) {
    match colours {
        Some(colours) => format_line(out, colours.color(record.level()), record, message),
        None => format_plain(out, message, record),
    }
}
