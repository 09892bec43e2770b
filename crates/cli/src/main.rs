mod backend;
mod commands;
mod error_presentation;

use std::{io, path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use sqlrun_core::{
    DEFAULT_MAX_ROWS, RelationName, SessionOverride,
    report::{DEFAULT_FILL_SAMPLE, DEFAULT_SEGMENT_COLUMN, DEFAULT_WORST_COLUMNS},
};
use tracing_subscriber::EnvFilter;

use crate::error_presentation::render_runtime_error;

const DEFAULT_LOG_FILTER: &str = "warn";

/// Run SQL scripts against a warehouse and build column reports.
///
/// Connection settings come from `SQLRUN_*` environment variables, optionally
/// loaded from a `.env` file.
#[derive(Debug, Parser)]
#[command(name = "sqlrun", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute every statement of a SQL file in order.
    Run(RunArgs),
    /// Column dictionary plus fill rates split by a segment column.
    Dictionary(DictionaryArgs),
    /// Overall non-null fill rate of every column.
    FillRates(FillRatesArgs),
    /// Materialize a SELECT script into a table, optionally benchmarking a sample first.
    Materialize(MaterializeArgs),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Run(_) => "run",
            Self::Dictionary(_) => "dictionary",
            Self::FillRates(_) => "fill-rates",
            Self::Materialize(_) => "materialize",
        }
    }
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Path to the .sql file.
    #[arg(long, value_name = "PATH")]
    file: PathBuf,
    /// Execute at most N statements.
    #[arg(long, value_name = "N")]
    max_statements: Option<usize>,
    /// Start at statement N (1-based).
    #[arg(long, value_name = "N", default_value_t = 1)]
    start_at: usize,
    /// Session override applied before the script; repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    overrides: Vec<SessionOverride>,
    /// Print each statement before executing it.
    #[arg(long)]
    print_sql: bool,
    /// Maximum rows printed per result set.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_ROWS)]
    max_rows: usize,
}

#[derive(Debug, Args)]
struct DictionaryArgs {
    #[arg(long, value_name = "DB.SCHEMA.VIEW", value_parser = RelationName::parse)]
    relation: RelationName,
    #[arg(long, default_value = DEFAULT_SEGMENT_COLUMN)]
    segment_column: String,
    #[arg(long, value_name = "DIR", default_value = "outputs")]
    out_dir: PathBuf,
    #[arg(long, value_name = "DIR", default_value = "docs/reference")]
    docs_dir: PathBuf,
    /// Emptiest columns listed per segment in the summary.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_WORST_COLUMNS)]
    worst: usize,
}

#[derive(Debug, Args)]
struct FillRatesArgs {
    #[arg(long, value_name = "DB.SCHEMA.TABLE", value_parser = RelationName::parse)]
    relation: RelationName,
    #[arg(long, value_name = "DIR", default_value = "outputs")]
    out_dir: PathBuf,
    /// Columns shown in the highest and lowest tables.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_FILL_SAMPLE)]
    sample: usize,
}

#[derive(Debug, Args)]
struct MaterializeArgs {
    /// SELECT script whose result becomes the table.
    #[arg(long, value_name = "PATH")]
    sql_file: PathBuf,
    /// Target schema (`db.schema` or `schema`).
    #[arg(long, value_name = "DB.SCHEMA")]
    schema: Option<String>,
    /// Target table name, without schema.
    #[arg(long)]
    table: String,
    #[arg(long, value_name = "N", default_value_t = 20_000)]
    sample_rows: u64,
    /// `FROM` clause to sample, as `<table> [alias]`.
    #[arg(long, value_name = "TABLE ALIAS")]
    sample_source: Option<String>,
    /// Stop after the sample build.
    #[arg(long, requires = "sample_source")]
    only_sample: bool,
    /// Keep the sample table after the full build.
    #[arg(long)]
    keep_sample: bool,
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let command = cli.command.name();
    let result = match cli.command {
        Command::Run(args) => commands::run(&args),
        Command::Dictionary(args) => commands::dictionary(&args),
        Command::FillRates(args) => commands::fill_rates(&args),
        Command::Materialize(args) => commands::materialize(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let code = error.exit_code();
            eprintln!("{}", render_runtime_error(error, command));
            ExitCode::from(code)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(io::stderr)
        .init();
}
