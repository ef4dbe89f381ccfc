// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Logging setup for type-ahead binaries
//!
//! Libraries in this workspace only emit `tracing` events. Binaries pick a
//! level, a format and a destination once at startup through
//! [`CliLoggingArgs`], which is meant to be flattened into their clap parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

// Re-export clap for convenience when using CliLoggingArgs
pub use clap;

// Re-export Level for convenience
pub use tracing::Level;

/// Directory name used under the platform data directory
const APP_DIR: &str = "typeahead";

/// Output format for log messages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable plaintext format
    #[default]
    Plaintext,
    /// Structured JSON format
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Plaintext => write!(f, "plaintext"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Log level accepted on the command line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CliLogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for Level {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

/// Where log output goes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogTarget {
    Console,
    File(PathBuf),
}

/// Logging flags shared by every binary
///
/// Logs go to the console unless `--log-file` or `--log-dir` is given.
#[derive(Clone, Debug, Default, clap::Args, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CliLoggingArgs {
    /// Log verbosity level (default: info)
    #[arg(long, value_enum, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<CliLogLevel>,

    /// Log output format (default: plaintext)
    #[arg(long, value_enum, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,

    /// Directory for log files
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Log filename, absolute or relative to --log-dir (or the platform
    /// log directory when --log-dir is absent)
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl CliLoggingArgs {
    /// Install the global subscriber for `component`
    pub fn init(&self, component: &str) -> anyhow::Result<()> {
        let level = self.log_level.unwrap_or_default().into();
        let format = self.log_format.unwrap_or_default();
        match self.target(component) {
            LogTarget::Console => init_with_writer(component, level, format, std::io::stderr),
            LogTarget::File(path) => init_to_file(component, level, format, &path),
        }
    }

    /// Resolve the destination implied by the flags
    pub fn target(&self, component: &str) -> LogTarget {
        match (&self.log_file, &self.log_dir) {
            (None, None) => LogTarget::Console,
            (Some(file), dir) => {
                let file = Path::new(file);
                match dir {
                    _ if file.is_absolute() => LogTarget::File(file.to_path_buf()),
                    Some(dir) => LogTarget::File(Path::new(dir).join(file)),
                    None => LogTarget::File(standard_log_path(component).with_file_name(file)),
                }
            }
            (None, Some(dir)) => LogTarget::File(Path::new(dir).join(format!("{component}.log"))),
        }
    }
}

/// Platform log file location for `component`
///
/// - Linux: `~/.local/share/typeahead/<component>.log`
/// - macOS: `~/Library/Logs/typeahead/<component>.log`
/// - Windows: `%APPDATA%\typeahead\<component>.log`
pub fn standard_log_path(component: &str) -> PathBuf {
    #[cfg(target_os = "macos")]
    let base = dirs::home_dir()
        .map(|home| home.join("Library").join("Logs"))
        .unwrap_or_else(|| PathBuf::from("/tmp"));

    #[cfg(not(target_os = "macos"))]
    let base = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"));

    base.join(APP_DIR).join(format!("{component}.log"))
}

/// Initialize logging into a file, creating its directory if needed
pub fn init_to_file(
    component: &str,
    default_level: Level,
    format: LogFormat,
    log_path: &Path,
) -> anyhow::Result<()> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = std::fs::OpenOptions::new().create(true).append(true).open(log_path)?;
    init_with_writer(component, default_level, format, std::sync::Mutex::new(log_file))
}

/// Initialize logging with a custom writer
///
/// `RUST_LOG` takes precedence; otherwise `default_level` applies both
/// globally and to `component`.
pub fn init_with_writer<W>(
    component: &str,
    default_level: Level,
    format: LogFormat,
    writer: W,
) -> anyhow::Result<()>
where
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},{}={}",
            default_level,
            component.replace('-', "_"),
            default_level
        ))
    });

    match format {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).json();
            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
        LogFormat::Plaintext => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer);
            #[cfg(debug_assertions)]
            let layer = layer.with_file(true).with_line_number(true);
            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Args {
        #[command(flatten)]
        logging: CliLoggingArgs,
    }

    #[test]
    fn console_is_the_default_target() {
        let args = Args::parse_from(["ta"]);
        assert_eq!(args.logging.target("ta-cli"), LogTarget::Console);
        assert_eq!(args.logging.log_level.unwrap_or_default(), CliLogLevel::Info);
    }

    #[test]
    fn log_dir_alone_uses_component_file() {
        let args = Args::parse_from(["ta", "--log-dir", "/var/log/ta"]);
        assert_eq!(
            args.logging.target("ta-cli"),
            LogTarget::File(PathBuf::from("/var/log/ta/ta-cli.log"))
        );
    }

    #[test]
    fn relative_log_file_joins_log_dir() {
        let args = Args::parse_from(["ta", "--log-dir", "/var/log/ta", "--log-file", "x.log"]);
        assert_eq!(
            args.logging.target("ta-cli"),
            LogTarget::File(PathBuf::from("/var/log/ta/x.log"))
        );

        let args = Args::parse_from(["ta", "--log-dir", "/var/log/ta", "--log-file", "/tmp/y.log"]);
        assert_eq!(args.logging.target("ta-cli"), LogTarget::File(PathBuf::from("/tmp/y.log")));
    }

    #[test]
    fn parses_levels_and_formats() {
        let args = Args::parse_from(["ta", "--log-level", "debug", "--log-format", "json"]);
        assert_eq!(args.logging.log_level, Some(CliLogLevel::Debug));
        assert_eq!(args.logging.log_format, Some(LogFormat::Json));
        assert_eq!(Level::from(CliLogLevel::Debug), Level::DEBUG);
    }

    #[test]
    fn serializes_only_given_flags() {
        let args = CliLoggingArgs {
            log_level: Some(CliLogLevel::Warn),
            ..Default::default()
        };
        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(json, serde_json::json!({ "log-level": "warn" }));
    }

    #[test]
    fn standard_path_ends_with_component() {
        let path = standard_log_path("ta-cli");
        assert!(path.ends_with("typeahead/ta-cli.log"));
    }

    #[test]
    fn relative_log_file_without_dir_uses_platform_directory() {
        let args = Args::parse_from(["ta", "--log-file", "debug.log"]);
        let LogTarget::File(path) = args.logging.target("ta-cli") else {
            panic!("expected a file target");
        };
        assert!(path.ends_with("typeahead/debug.log"));
    }
}
