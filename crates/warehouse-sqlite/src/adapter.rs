use std::error::Error as StdError;

use rusqlite::{Connection, types::ValueRef};
use sqlrun_core::{
    ColumnInfo, ConnectionConfig, ExecutionError, QueryOutcome, RelationName, Result, ResultTable,
    Value, WarehouseClient,
};
use tracing::debug;

use crate::queries;

const BACKEND_NAME: &str = "sqlite";
const DEFAULT_SQLITE_SCHEMA: &str = "main";

pub struct SqliteWarehouse {
    connection: Connection,
}

pub fn connect(config: &ConnectionConfig) -> Result<Box<dyn WarehouseClient>> {
    Ok(Box::new(SqliteWarehouse::open(&config.database)?))
}

impl SqliteWarehouse {
    /// Opens a database file, or an in-memory database for `:memory:`.
    pub fn open(path: &str) -> Result<Self> {
        let connection = Connection::open(path)
            .map_err(|source| ExecutionError::connect(BACKEND_NAME, source))?;
        Ok(Self::from_connection(connection))
    }

    #[must_use]
    pub fn from_connection(connection: Connection) -> Self {
        debug!(version = rusqlite::version(), "opened sqlite warehouse");
        Self { connection }
    }
}

impl WarehouseClient for SqliteWarehouse {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn execute(&mut self, sql: &str) -> Result<QueryOutcome> {
        let mut statement = self
            .connection
            .prepare(sql)
            .map_err(|source| execution_error(sql, source))?;

        // Comment-only statements prepare to nothing and cannot be stepped.
        if statement.column_count() == 0 {
            drop(statement);
            self.connection
                .execute_batch(sql)
                .map_err(|source| execution_error(sql, source))?;
            return Ok(QueryOutcome::Acknowledged);
        }

        let columns = statement
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let width = columns.len();
        let mut table = ResultTable::new(columns);

        let mut rows = statement
            .query([])
            .map_err(|source| execution_error(sql, source))?;
        while let Some(row) = rows.next().map_err(|source| execution_error(sql, source))? {
            let mut values = Vec::with_capacity(width);
            for index in 0..width {
                let value = row
                    .get_ref(index)
                    .map_err(|source| execution_error(sql, source))?;
                values.push(decode_value(value));
            }
            table.push_row(values);
        }

        Ok(QueryOutcome::Rows(table))
    }

    fn describe_columns(&mut self, relation: &RelationName) -> Result<Vec<ColumnInfo>> {
        let schema = relation.schema.as_deref().unwrap_or(DEFAULT_SQLITE_SCHEMA);
        let mut statement = self
            .connection
            .prepare(queries::TABLE_COLUMNS_QUERY)
            .map_err(|source| execution_error(queries::TABLE_COLUMNS_QUERY, source))?;
        let rows = statement
            .query_map([relation.name.as_str(), schema], |row| {
                let not_null: bool = row.get(2)?;
                let cid: i64 = row.get(3)?;
                Ok(ColumnInfo {
                    name: row.get(0)?,
                    data_type: row.get(1)?,
                    nullable: !not_null,
                    ordinal: usize::try_from(cid).unwrap_or_default() + 1,
                })
            })
            .map_err(|source| execution_error(queries::TABLE_COLUMNS_QUERY, source))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|source| execution_error(queries::TABLE_COLUMNS_QUERY, source))
    }
}

fn decode_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(integer) => Value::Integer(integer),
        ValueRef::Real(real) => Value::Real(real),
        ValueRef::Text(text) => Value::Text(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(blob) => Value::Text(format!("<blob {} bytes>", blob.len())),
    }
}

fn execution_error<E>(sql: &str, source: E) -> sqlrun_core::Error
where
    E: StdError + Send + Sync + 'static,
{
    ExecutionError::statement_failed(0, sql, 0, source).into()
}
