use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::Local;
use sqlrun_core::{
    Error, Executor, RelationName, RunOptions, StatementWindow,
    materialize::{MaterializeOptions, Materializer, SampleSpec},
    report::{DictionaryOutputs, DictionaryReport, FillRateOutputs, FillRateReport},
};

use crate::{
    DictionaryArgs, FillRatesArgs, MaterializeArgs, RunArgs, backend,
    error_presentation::{CliError, CliResult},
};

pub(crate) fn run(args: &RunArgs) -> CliResult<()> {
    let source = read_sql(&args.file)?;
    let mut client = backend::connect_from_env()?;

    let options = RunOptions {
        label: args.file.display().to_string(),
        window: StatementWindow::new(args.start_at, args.max_statements),
        overrides: args.overrides.clone(),
        print_sql: args.print_sql,
        max_rows: args.max_rows,
    };
    let mut stdout = io::stdout().lock();
    Executor::new(client.as_mut()).run_script(&source, &options, &mut stdout)?;
    Ok(())
}

pub(crate) fn dictionary(args: &DictionaryArgs) -> CliResult<()> {
    let mut client = backend::connect_from_env()?;
    let report = DictionaryReport::generate(
        client.as_mut(),
        &args.relation,
        &args.segment_column,
        Local::now().fixed_offset(),
    )?;

    let outputs = DictionaryOutputs::new(&args.relation, &args.out_dir, &args.docs_dir);
    let written = report.write(&outputs, args.worst)?;
    announce(&written)
}

pub(crate) fn fill_rates(args: &FillRatesArgs) -> CliResult<()> {
    let mut client = backend::connect_from_env()?;
    let report = FillRateReport::generate(client.as_mut(), &args.relation)?;

    let outputs = FillRateOutputs::new(&args.relation, &args.out_dir);
    let written = report.write(&outputs, args.sample)?;
    announce(&written)
}

pub(crate) fn materialize(args: &MaterializeArgs) -> CliResult<()> {
    let script = read_sql(&args.sql_file)?;
    let target = match &args.schema {
        Some(schema) => RelationName::parse(&format!("{schema}.{}", args.table)),
        None => RelationName::parse(&args.table),
    }
    .map_err(Error::from)?;
    let sample = args
        .sample_source
        .as_deref()
        .map(|source| SampleSpec::parse(source, args.sample_rows))
        .transpose()?;

    let options = MaterializeOptions {
        target,
        sample,
        only_sample: args.only_sample,
        keep_sample: args.keep_sample,
    };
    let mut client = backend::connect_from_env()?;
    let mut stdout = io::stdout().lock();
    Materializer::new(client.as_mut()).run(&script, &options, &mut stdout)?;
    Ok(())
}

fn read_sql(path: &Path) -> CliResult<String> {
    fs::read_to_string(path).map_err(|source| CliError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

fn announce(written: &[PathBuf]) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    for path in written {
        writeln!(stdout, "OK: {}", path.display()).map_err(Error::Output)?;
    }
    Ok(())
}
