//! Materialization of a SELECT script into a table, with an optional sampled
//! benchmark run used to estimate the cost of the full build.

use std::{
    io::Write,
    time::{Duration, Instant},
};

use tracing::info;

use crate::{
    Error, RelationName, ReportError, Result, WarehouseClient, strip_trailing_terminator,
};

const LEGACY_SUFFIX: &str = "_V1";

/// Which `FROM <table> <alias>` clause of the script to sample, and how many
/// rows to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSpec {
    pub table: RelationName,
    pub alias: Option<String>,
    pub rows: u64,
}

impl SampleSpec {
    /// Parses `"<table> [alias]"`.
    pub fn parse(source: &str, rows: u64) -> Result<Self> {
        let mut parts = source.split_whitespace();
        let table = RelationName::parse(parts.next().unwrap_or_default())?;
        let alias = parts.next().map(str::to_string);
        if parts.next().is_some() {
            return Err(ReportError::SampleSourceNotFound {
                needle: source.to_string(),
            }
            .into());
        }
        Ok(Self { table, alias, rows })
    }

    fn needle(&self) -> String {
        match &self.alias {
            Some(alias) => format!("FROM {} {alias}", self.table),
            None => format!("FROM {}", self.table),
        }
    }

    fn replacement(&self) -> String {
        let alias = self.alias.as_deref().unwrap_or(&self.table.name);
        format!(
            "FROM (SELECT * FROM {} LIMIT {}) {alias}",
            self.table, self.rows
        )
    }

    /// Rewrites the first occurrence of the source clause in `sql` so it reads
    /// from a bounded subquery instead.
    pub fn apply(&self, sql: &str) -> Result<String> {
        let needle = self.needle();
        if !sql.contains(&needle) {
            return Err(ReportError::SampleSourceNotFound { needle }.into());
        }
        Ok(sql.replacen(&needle, &self.replacement(), 1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeOptions {
    pub target: RelationName,
    pub sample: Option<SampleSpec>,
    pub only_sample: bool,
    pub keep_sample: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBuild {
    pub table: RelationName,
    pub rows: i64,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuild {
    pub universe_rows: i64,
    pub build: TableBuild,
    /// Linear extrapolation of the full build time.
    pub estimate: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeSummary {
    pub sample: Option<SampleBuild>,
    pub full: Option<TableBuild>,
}

#[must_use]
pub fn sample_table_name(target: &RelationName, rows: u64) -> RelationName {
    target.sibling(format!("{}_SAMPLE_{rows}", target.name))
}

/// The `<table>_V1` leftover of an earlier naming scheme, unless the target is
/// itself a `_V1` table.
#[must_use]
pub fn legacy_table_name(target: &RelationName) -> Option<RelationName> {
    (!target.name.to_uppercase().ends_with(LEGACY_SUFFIX))
        .then(|| target.sibling(format!("{}{LEGACY_SUFFIX}", target.name)))
}

#[must_use]
pub fn linear_estimate(sample_elapsed: Duration, universe_rows: i64, sample_rows: i64) -> Option<Duration> {
    if sample_rows <= 0 || universe_rows < 0 {
        return None;
    }
    let scale = universe_rows as f64 / sample_rows as f64;
    Duration::try_from_secs_f64(sample_elapsed.as_secs_f64() * scale).ok()
}

pub struct Materializer<'a> {
    client: &'a mut dyn WarehouseClient,
}

impl<'a> Materializer<'a> {
    #[must_use]
    pub fn new(client: &'a mut dyn WarehouseClient) -> Self {
        Self { client }
    }

    pub fn run<W>(
        &mut self,
        script: &str,
        options: &MaterializeOptions,
        out: &mut W,
    ) -> Result<MaterializeSummary>
    where
        W: Write + ?Sized,
    {
        let select_sql = strip_trailing_terminator(script);
        let mut summary = MaterializeSummary::default();

        if let Some(spec) = &options.sample {
            let sampled_sql = spec.apply(select_sql)?;
            summary.sample = Some(self.build_sample(spec, &options.target, &sampled_sql, out)?);
        }

        if options.only_sample {
            emit(out, "\n--only-sample: skipping the full build.")?;
            return Ok(summary);
        }

        emit(out, &format!("\nCTAS FULL: {}", options.target))?;
        self.drop_if_exists(&options.target, out)?;
        if let Some(legacy) = legacy_table_name(&options.target) {
            self.drop_if_exists(&legacy, out)?;
        }
        let full = self.build_table(&options.target, select_sql)?;
        emit(out, &format!("Rows materialized = {}", full.rows))?;
        emit(
            out,
            &format!("Elapsed (min) = {:.2}", full.elapsed.as_secs_f64() / 60.0),
        )?;
        summary.full = Some(full);

        if let Some(spec) = options.sample.as_ref().filter(|_| !options.keep_sample) {
            let sample_table = sample_table_name(&options.target, spec.rows);
            emit(out, &format!("\nRemoving sample table: {sample_table}"))?;
            self.execute(&drop_sql(&sample_table))?;
        }

        Ok(summary)
    }

    fn build_sample<W>(
        &mut self,
        spec: &SampleSpec,
        target: &RelationName,
        sampled_sql: &str,
        out: &mut W,
    ) -> Result<SampleBuild>
    where
        W: Write + ?Sized,
    {
        emit(out, &format!("Counting source universe of {}...", spec.table))?;
        let universe_rows = self.count_rows(&spec.table)?;
        emit(out, &format!("TOTAL {} = {universe_rows}", spec.table))?;

        let sample_table = sample_table_name(target, spec.rows);
        emit(out, &format!("\nCTAS sample (benchmark): {sample_table}"))?;
        self.execute(&drop_sql(&sample_table))?;
        let build = self.build_table(&sample_table, sampled_sql)?;
        emit(out, &format!("Sample rows materialized = {}", build.rows))?;
        emit(
            out,
            &format!("Sample elapsed (s) = {:.2}", build.elapsed.as_secs_f64()),
        )?;

        let estimate = linear_estimate(build.elapsed, universe_rows, build.rows);
        if let Some(estimate) = estimate {
            emit(
                out,
                &format!(
                    "Linear full-build estimate (min) ~ {:.1}",
                    estimate.as_secs_f64() / 60.0
                ),
            )?;
            emit(out, "Note: the estimate is approximate; cost may not scale linearly.")?;
        }

        Ok(SampleBuild {
            universe_rows,
            build,
            estimate,
        })
    }

    fn build_table(&mut self, table: &RelationName, select_sql: &str) -> Result<TableBuild> {
        let started = Instant::now();
        self.execute(&format!("CREATE TABLE {table} AS {select_sql}"))?;
        let elapsed = started.elapsed();
        let rows = self.count_rows(table)?;
        info!(%table, rows, elapsed_ms = elapsed.as_millis() as u64, "materialized table");
        Ok(TableBuild {
            table: table.clone(),
            rows,
            elapsed,
        })
    }

    fn drop_if_exists<W>(&mut self, table: &RelationName, out: &mut W) -> Result<()>
    where
        W: Write + ?Sized,
    {
        emit(out, &format!("DROP (cleanup) table if it exists: {table}"))?;
        self.execute(&drop_sql(table))
    }

    fn count_rows(&mut self, table: &RelationName) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) AS n FROM {table}");
        let rows = self
            .client
            .execute(&sql)?
            .into_rows()
            .ok_or_else(|| ReportError::NoResultSet { sql: sql.clone() })?;
        let value = rows
            .rows()
            .first()
            .and_then(|row| row.first())
            .ok_or_else(|| ReportError::MissingColumn {
                column: "n".to_string(),
            })?;
        value.as_i64().ok_or_else(|| {
            ReportError::UnexpectedValue {
                column: "n".to_string(),
                value: value.to_string(),
            }
            .into()
        })
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        self.client.execute(sql).map(|_| ())
    }
}

fn drop_sql(table: &RelationName) -> String {
    format!("DROP TABLE IF EXISTS {table}")
}

fn emit<W>(out: &mut W, line: &str) -> Result<()>
where
    W: Write + ?Sized,
{
    writeln!(out, "{line}").map_err(Error::Output)
}
