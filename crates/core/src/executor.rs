use std::io::Write;

use tracing::{debug, info};

use crate::{
    Error, QueryOutcome, Result, SessionOverride, StatementWindow, WarehouseClient,
    renderer::render_text, split_statements,
};

pub const DEFAULT_MAX_ROWS: usize = 40;
const STATEMENT_RULE_WIDTH: usize = 90;
const ACKNOWLEDGED_MESSAGE: &str = "OK (no result set)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Shown in each statement header, usually the script path.
    pub label: String,
    pub window: StatementWindow,
    pub overrides: Vec<SessionOverride>,
    pub print_sql: bool,
    pub max_rows: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            label: String::new(),
            window: StatementWindow::default(),
            overrides: Vec::new(),
            print_sql: false,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total_statements: usize,
    pub executed_statements: usize,
    pub result_sets: usize,
}

pub struct Executor<'a> {
    client: &'a mut dyn WarehouseClient,
}

impl<'a> Executor<'a> {
    #[must_use]
    pub fn new(client: &'a mut dyn WarehouseClient) -> Self {
        Self { client }
    }

    /// Splits `source`, applies session overrides, then runs the statements
    /// selected by the window in order, writing each outcome to `out`. Stops
    /// at the first failing statement.
    pub fn run_script<W>(
        &mut self,
        source: &str,
        options: &RunOptions,
        out: &mut W,
    ) -> Result<RunSummary>
    where
        W: Write + ?Sized,
    {
        let statements = split_statements(source);
        let total = statements.len();
        info!(
            backend = self.client.backend_name(),
            total,
            start_at = options.window.start_at(),
            "running script"
        );

        self.apply_overrides(&options.overrides)?;

        let mut summary = RunSummary {
            total_statements: total,
            ..RunSummary::default()
        };

        for statement in statements
            .iter()
            .skip_while(|statement| statement.index() < options.window.start_at())
            .take_while(|statement| options.window.contains(statement.index()))
        {
            write_header(out, statement.index(), total, &options.label)?;
            if options.print_sql {
                writeln!(out, "{}", statement.sql()).map_err(Error::Output)?;
            }

            debug!(index = statement.index(), "executing statement");
            let outcome = self.client.execute(statement.sql()).map_err(|error| {
                reposition(error, statement.index(), summary.executed_statements)
            })?;
            summary.executed_statements += 1;

            match outcome {
                QueryOutcome::Acknowledged => {
                    writeln!(out, "{ACKNOWLEDGED_MESSAGE}").map_err(Error::Output)?;
                }
                QueryOutcome::Rows(table) => {
                    summary.result_sets += 1;
                    out.write_all(render_text(&table, options.max_rows).as_bytes())
                        .map_err(Error::Output)?;
                }
            }
        }

        info!(
            executed = summary.executed_statements,
            result_sets = summary.result_sets,
            "script finished"
        );
        Ok(summary)
    }

    fn apply_overrides(&mut self, overrides: &[SessionOverride]) -> Result<()> {
        for (position, session_override) in overrides.iter().enumerate() {
            let sql = session_override.to_sql();
            debug!(%sql, "applying session override");
            self.client
                .execute(&sql)
                .map_err(|error| reposition(error, 0, position))?;
        }
        Ok(())
    }
}

fn reposition(error: Error, index: usize, executed: usize) -> Error {
    match error {
        Error::Execute(execution) => execution.at_position(index, executed).into(),
        other => other,
    }
}

fn write_header<W>(out: &mut W, index: usize, total: usize, label: &str) -> Result<()>
where
    W: Write + ?Sized,
{
    writeln!(out).map_err(Error::Output)?;
    writeln!(out, "{}", "=".repeat(STATEMENT_RULE_WIDTH)).map_err(Error::Output)?;
    let written = if label.is_empty() {
        writeln!(out, "[statement {index}/{total}]")
    } else {
        writeln!(out, "[statement {index}/{total}] {label}")
    };
    written.map_err(Error::Output)
}
