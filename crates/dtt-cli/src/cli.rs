//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "dtt",
    version,
    about = "Convert DICOM datasets between BSON and JSON documents and query nested sequences",
    long_about = "Convert DICOM datasets between BSON and JSON tree documents.\n\n\
                  Documents are read by extension (.bson or .json), decoded against the\n\
                  built-in data dictionary and re-encoded. Pathway queries walk nested\n\
                  sequences and print the value they reach."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode a document and re-encode it as BSON or JSON.
    Convert(ConvertArgs),

    /// Evaluate a pathway against a document.
    Query(QueryArgs),

    /// Show the natural storage type of attributes.
    Type(TypeArgs),
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Input document (.json or .bson).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Target document format.
    #[arg(long = "to", value_enum)]
    pub to: FormatArg,

    /// Embed binary values instead of omitting them.
    #[arg(long = "embed-binary")]
    pub embed_binary: bool,

    /// Strict JSON numeric strings: reject NUL padding and IS values outside
    /// the signed 32-bit range.
    #[arg(long = "strict")]
    pub strict: bool,

    /// Output file (default: stdout for JSON, required for BSON).
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct QueryArgs {
    /// Input document (.json or .bson).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Pathway, e.g. `ContentSequence->TextValue+`.
    #[arg(value_name = "PATHWAY")]
    pub pathway: String,

    /// Relative conditional pathway (`.`, `[]`, `..->Keyword`, `[..]->Keyword`).
    #[arg(long = "where", value_name = "PATH", requires = "matches")]
    pub condition: Option<String>,

    /// Regular expression the conditional values are tested against.
    #[arg(long = "matches", value_name = "REGEX", requires = "condition")]
    pub matches: Option<String>,
}

#[derive(Parser)]
pub struct TypeArgs {
    /// Attribute keywords or tags.
    #[arg(value_name = "KEYWORD")]
    pub keywords: Vec<String>,

    /// Resolve the columns of a JSON table template instead.
    #[arg(long = "template", value_name = "FILE", conflicts_with = "keywords")]
    pub template: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Bson,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
