use std::{collections::HashMap, io};

use sqlrun_core::{
    ColumnInfo, ExecutionError, QueryOutcome, RelationName, Result, ResultTable, Value,
    WarehouseClient,
};

/// Records executed SQL and replays canned outcomes. Statements without a
/// canned outcome are acknowledged.
#[derive(Debug, Default)]
pub struct FakeWarehouse {
    executed_sql: Vec<String>,
    outcomes: HashMap<String, QueryOutcome>,
    prefix_outcomes: Vec<(String, QueryOutcome)>,
    columns: HashMap<String, Vec<ColumnInfo>>,
    fail_on_sql: Option<(String, String)>,
}

#[allow(dead_code)]
impl FakeWarehouse {
    pub fn set_rows(&mut self, sql: &str, columns: &[&str], rows: Vec<Vec<Value>>) {
        let table = ResultTable::with_rows(
            columns.iter().map(|column| (*column).to_string()).collect(),
            rows,
        );
        self.outcomes
            .insert(sql.to_string(), QueryOutcome::Rows(table));
    }

    /// Canned rows for any statement starting with `prefix`.
    pub fn set_rows_for_prefix(&mut self, prefix: &str, columns: &[&str], rows: Vec<Vec<Value>>) {
        let table = ResultTable::with_rows(
            columns.iter().map(|column| (*column).to_string()).collect(),
            rows,
        );
        self.prefix_outcomes
            .push((prefix.to_string(), QueryOutcome::Rows(table)));
    }

    pub fn set_columns(&mut self, relation: &str, columns: &[(&str, &str)]) {
        let columns = columns
            .iter()
            .enumerate()
            .map(|(position, (name, data_type))| ColumnInfo {
                name: (*name).to_string(),
                data_type: (*data_type).to_string(),
                nullable: true,
                ordinal: position + 1,
            })
            .collect();
        self.columns.insert(relation.to_string(), columns);
    }

    pub fn set_fail_on_sql(&mut self, sql: &str, message: &str) {
        self.fail_on_sql = Some((sql.to_string(), message.to_string()));
    }

    pub fn executed_sql(&self) -> &[String] {
        &self.executed_sql
    }
}

impl WarehouseClient for FakeWarehouse {
    fn backend_name(&self) -> &'static str {
        "fake"
    }

    fn execute(&mut self, sql: &str) -> Result<QueryOutcome> {
        if let Some((failing_sql, message)) = &self.fail_on_sql
            && failing_sql == sql
        {
            return Err(ExecutionError::statement_failed(
                self.executed_sql.len(),
                sql,
                self.executed_sql.len(),
                io::Error::other(message.clone()),
            )
            .into());
        }

        self.executed_sql.push(sql.to_string());
        if let Some(outcome) = self.outcomes.get(sql) {
            return Ok(outcome.clone());
        }
        let prefixed = self
            .prefix_outcomes
            .iter()
            .find(|(prefix, _)| sql.starts_with(prefix.as_str()))
            .map(|(_, outcome)| outcome.clone());
        Ok(prefixed.unwrap_or(QueryOutcome::Acknowledged))
    }

    fn describe_columns(&mut self, relation: &RelationName) -> Result<Vec<ColumnInfo>> {
        Ok(self
            .columns
            .get(&relation.to_string())
            .cloned()
            .unwrap_or_default())
    }
}
