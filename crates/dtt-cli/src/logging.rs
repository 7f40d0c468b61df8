//! `tracing` subscriber setup for the `dtt` binary.
//!
//! Library crates only emit events; this module decides where they go.
//!
//! | Level   | Used for                                                    |
//! |---------|-------------------------------------------------------------|
//! | `error` | a conversion or query that failed                           |
//! | `warn`  | dictionary rows that were skipped, values that were repaired |
//! | `info`  | command progress                                            |
//! | `debug` | omitted binary values, pathway branch counts                |
//! | `trace` | creator linking, skipped group lengths                      |

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::{self, writer::BoxMakeWriter};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Crates whose events follow the configured level; everything else stays at
/// `warn`.
const WORKSPACE_CRATES: [&str; 7] = [
    "dtt",
    "dtt_cli",
    "dtt_codec",
    "dtt_dictionary",
    "dtt_document",
    "dtt_pathway",
    "dtt_types",
];

type FilteredRegistry = Layered<EnvFilter, Registry>;
type OutputLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` replace `level_filter`.
    pub use_env_filter: bool,
    pub with_timestamps: bool,
    pub with_target: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Append to this file instead of writing to stderr.
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_timestamps: false,
            with_target: false,
            with_ansi: true,
            format: LogFormat::Pretty,
            log_file: None,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn with_level_filter(mut self, level_filter: LevelFilter) -> Self {
        self.level_filter = level_filter;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        let configured = || EnvFilter::new(filter_directives(self.level_filter));
        if self.use_env_filter {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| configured())
        } else {
            configured()
        }
    }

    fn output_layer(&self, writer: BoxMakeWriter) -> OutputLayer {
        let layer = fmt::layer().with_writer(writer).with_target(self.with_target);
        match (self.format, self.with_timestamps) {
            (LogFormat::Json, _) => layer.json().boxed(),
            (LogFormat::Compact, true) => layer.compact().with_ansi(self.with_ansi).boxed(),
            (LogFormat::Compact, false) => layer
                .compact()
                .with_ansi(self.with_ansi)
                .without_time()
                .boxed(),
            (LogFormat::Pretty, true) => layer.with_ansi(self.with_ansi).boxed(),
            (LogFormat::Pretty, false) => layer.with_ansi(self.with_ansi).without_time().boxed(),
        }
    }
}

/// Install the global subscriber. Call once, before any command runs.
///
/// # Errors
///
/// Fails when the log file cannot be opened for appending.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let writer = match &config.log_file {
        Some(path) => BoxMakeWriter::new(Mutex::new(open_log_file(path)?)),
        None => BoxMakeWriter::new(io::stderr),
    };
    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(config.output_layer(writer))
        .init();
    Ok(())
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// `EnvFilter` directives that apply `level` to the workspace crates and
/// keep dependencies at `warn`.
pub fn filter_directives(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    std::iter::once("warn".to_string())
        .chain(WORKSPACE_CRATES.iter().map(|name| format!("{name}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}
