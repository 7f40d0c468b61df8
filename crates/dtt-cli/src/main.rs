//! `dtt`: DICOM tree documents and pathway queries.

use std::fs;
use std::io::{self, IsTerminal, Write};

use anyhow::{Context, Result, bail};
use clap::{ColorChoice, Parser};
use dtt_cli::commands::{
    DocumentFormat, read_document, run_convert, run_query, template_rows, type_rows, type_table,
};
use dtt_cli::logging::{LogConfig, LogFormat, init_logging};
use dtt_dictionary::Dictionary;
use dtt_document::{DocumentOptions, JsonMode};
use tracing::level_filters::LevelFilter;

mod cli;

use crate::cli::{Cli, Command, ConvertArgs, FormatArg, LogFormatArg, LogLevelArg, QueryArgs, TypeArgs};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let dict = Dictionary::standard();
    let result = match &cli.command {
        Command::Convert(args) => convert(dict, args),
        Command::Query(args) => query(dict, args),
        Command::Type(args) => show_types(dict, args),
    };
    if let Err(error) = result {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn convert(dict: &Dictionary, args: &ConvertArgs) -> Result<()> {
    let options = DocumentOptions::new()
        .with_embed_binary(args.embed_binary)
        .with_json_mode(if args.strict { JsonMode::Strict } else { JsonMode::Lenient });
    let target = match args.to {
        FormatArg::Bson => DocumentFormat::Bson,
        FormatArg::Json => DocumentFormat::Json,
    };
    let bytes = run_convert(dict, &args.input, target, options)?;
    match &args.output {
        Some(path) => fs::write(path, &bytes).with_context(|| format!("write {}", path.display()))?,
        None if target == DocumentFormat::Bson && io::stdout().is_terminal() => {
            bail!("refusing to write BSON to a terminal; pass --output")
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes)?;
            if target == DocumentFormat::Json {
                writeln!(stdout)?;
            }
        }
    }
    Ok(())
}

fn query(dict: &Dictionary, args: &QueryArgs) -> Result<()> {
    let dataset = read_document(dict, &args.input, DocumentOptions::new())?;
    let conditional = args.condition.as_deref().zip(args.matches.as_deref());
    match run_query(dict, &dataset, &args.pathway, conditional)? {
        Some(text) => println!("{text}"),
        None => tracing::info!(pathway = %args.pathway, "No match"),
    }
    Ok(())
}

fn show_types(dict: &Dictionary, args: &TypeArgs) -> Result<()> {
    let rows = match &args.template {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            template_rows(dict, &text)?
        }
        None if args.keywords.is_empty() => bail!("give at least one keyword or --template"),
        None => type_rows(dict, &args.keywords)?,
    };
    println!("{}", type_table(&rows));
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
