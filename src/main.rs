//! h2dump command line.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{ArgAction, Args, Parser, Subcommand};
use h2dump::{dump_file, split, DumpOptions, RecordSummary, MAX_HEADER_BLOCK_SIZE};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "h2dump", version, about = "Decode HTTP/2 connections from capture logs")]
struct Cli {
    /// Increase log verbosity on stderr (-v, -vv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbosity: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every HTTP/2 frame in a capture
    Dump(DumpArgs),
    /// Split a capture into one file per source id
    Split(SplitArgs),
}

#[derive(Args, Debug)]
struct DumpArgs {
    /// Capture file
    logfile: PathBuf,

    /// Do not print container record lines
    #[arg(long = "no-records", action = ArgAction::SetTrue)]
    no_records: bool,

    /// Largest header block accepted, in bytes
    #[arg(long = "max-header-block", default_value_t = MAX_HEADER_BLOCK_SIZE)]
    max_header_block: usize,

    /// Initial HPACK dynamic table size limit
    #[arg(long = "header-table-size")]
    header_table_size: Option<usize>,
}

impl DumpArgs {
    fn to_options(&self) -> DumpOptions {
        DumpOptions::new()
            .with_show_records(!self.no_records)
            .with_max_header_block_size(self.max_header_block)
            .with_header_table_size(self.header_table_size)
    }
}

#[derive(Args, Debug)]
struct SplitArgs {
    /// Capture file
    logfile: PathBuf,
    /// Output directory, one file per source id
    directory: PathBuf,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_dump(args: &DumpArgs) -> Result<(), String> {
    let report = dump_file(&args.logfile, &args.to_options())
        .map_err(|e| error_line(&args.logfile, e))?;
    print!("{}", report);
    Ok(())
}

fn run_split(args: &SplitArgs) -> Result<(), String> {
    let capture = std::fs::read(&args.logfile).map_err(|e| error_line(&args.logfile, e))?;
    let records = split(&capture, &args.directory).map_err(|e| error_line(&args.logfile, e))?;
    for record in &records {
        println!("{}", RecordSummary::from(record));
    }
    Ok(())
}

fn error_line(path: &Path, err: impl std::fmt::Display) -> String {
    format!("Error: {}: {}", path.display(), err)
}

/// One-line summary of a command line error, without clap's usage block.
fn usage_error(err: &clap::Error) -> String {
    match err.kind() {
        ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            "missing subcommand (dump or split)".to_string()
        }
        _ => {
            let message = err.to_string();
            let summary = message
                .lines()
                .take_while(|line| !line.starts_with("Usage:"))
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            let summary = summary.trim_start_matches("error: ");
            if summary.is_empty() {
                "invalid arguments".to_string()
            } else {
                summary.to_string()
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            println!("Error: {}", usage_error(&err));
            return ExitCode::FAILURE;
        }
        // --help and --version
        Err(err) => err.exit(),
    };
    init_tracing(cli.verbosity);

    let result = match &cli.command {
        Command::Dump(args) => run_dump(args),
        Command::Split(args) => run_split(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(line) => {
            println!("{}", line);
            ExitCode::FAILURE
        }
    }
}
