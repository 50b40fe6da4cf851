//! Purpose: `chunkline` CLI entry point: load a delimited file into a columnar table.
//! Role: Binary crate root; parses args, times the pipeline, emits JSON or rows on stdout.
//! Invariants: Errors go to stderr (JSON when stderr is not a terminal, text otherwise).
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: Logs go to stderr via `tracing`; stdout carries only results.
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::str::FromStr;

use clap::{CommandFactory, Parser, Subcommand, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chunkline::api::{
    ColumnType, DEFAULT_BUFFER_SIZE, DEFAULT_DEPTH, Error, ErrorKind, PipelineConfig,
    RowBoundary, load_path, to_exit_code,
};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

#[derive(Parser)]
#[command(
    name = "chunkline",
    version,
    about = "Load fixed-schema delimited text into an in-memory columnar table",
    long_about = None,
    after_help = r#"EXAMPLES
  $ chunkline load trips.csv --schema int,text,decimal
  $ chunkline load trips.csv --schema int,text,decimal --carry-rows --print
  $ RUST_LOG=debug chunkline load trips.csv --schema int --workers 1

NOTES
  The first line of the file is treated as a header and skipped.
  Without --carry-rows, rows that straddle a buffer boundary are dropped."#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a file and report what was ingested
    Load {
        #[arg(help = "Input file", value_hint = clap::ValueHint::FilePath)]
        path: PathBuf,
        #[arg(
            long,
            required = true,
            value_delimiter = ',',
            value_parser = ColumnType::from_str,
            help = "Column types in order, comma-separated (int, decimal, text)"
        )]
        schema: Vec<ColumnType>,
        #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE, help = "Bytes per buffer")]
        buffer_size: usize,
        #[arg(long, default_value_t = DEFAULT_DEPTH, help = "Max buffers in flight")]
        depth: usize,
        #[arg(long, help = "Parse worker threads (default: available parallelism)")]
        workers: Option<usize>,
        #[arg(long, help = "Carry rows that straddle buffer boundaries into the next buffer")]
        carry_rows: bool,
        #[arg(long, help = "Print every row instead of the JSON summary")]
        print: bool,
    },
    /// Generate shell completions
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Run `chunkline load --help` for usage."));
            }
        },
    };

    init_tracing();

    match cli.command {
        Command::Load {
            path,
            schema,
            buffer_size,
            depth,
            workers,
            carry_rows,
            print,
        } => {
            let mut config = PipelineConfig::new()
                .with_buffer_size(buffer_size)
                .with_depth(depth);
            if let Some(workers) = workers {
                config = config.with_workers(workers);
            }
            if carry_rows {
                config = config.with_boundary(RowBoundary::Carry);
            }

            let (table, report) = load_path(&path, &schema, &config)?;
            let write_err = |err| Error::from_io(err, "failed to write stdout");
            let stdout = io::stdout();
            let mut out = io::BufWriter::new(stdout.lock());
            if print {
                table.render(&mut out)?;
                info!(
                    rows = report.rows,
                    chunks = report.chunks,
                    elapsed_ms = report.elapsed_ms,
                    "load finished"
                );
            } else {
                let line = serde_json::to_string(&report).map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to encode summary")
                        .with_source(err)
                })?;
                writeln!(out, "{line}").map_err(write_err)?;
            }
            out.flush().map_err(write_err)?;
            Ok(RunOutcome::ok())
        }
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "chunkline", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    rendered
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_start_matches("error:").trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    err.message()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{:?}", err.kind()))
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut current = err.source();
    while let Some(source) = current {
        causes.push(source.to_string());
        current = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(seq) = err.seq() {
        inner.insert("seq".to_string(), json!(seq));
    }
    if let Some(column) = err.column() {
        inner.insert("column".to_string(), json!(column));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    if let Some(path) = err.path() {
        lines.push(format!("path: {}", path.display()));
    }
    for cause in error_causes(err) {
        lines.push(format!("caused by: {cause}"));
    }
    lines.join("\n")
}
