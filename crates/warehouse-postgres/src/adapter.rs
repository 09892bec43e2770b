use std::{error::Error as StdError, io};

use postgres::{Client, NoTls, Row, SimpleQueryMessage, types::FromSqlOwned};
use sqlrun_core::{
    ColumnInfo, ConnectionConfig, ExecutionError, QueryOutcome, RelationName, Result, ResultTable,
    Value, WarehouseClient, quote_identifier,
};
use tracing::debug;

use crate::queries;

const BACKEND_NAME: &str = "postgres";
const DEFAULT_POSTGRES_HOST: &str = "127.0.0.1";
const MINIMUM_POSTGRES_MAJOR_VERSION: u16 = 12;

pub struct PostgresWarehouse {
    client: Client,
    server_version: (u16, u16),
}

pub fn connect(config: &ConnectionConfig) -> Result<Box<dyn WarehouseClient>> {
    Ok(Box::new(PostgresWarehouse::connect(config)?))
}

/// Driver configuration for `config`; the host falls back to the loopback
/// address.
#[must_use]
pub fn client_config(config: &ConnectionConfig) -> postgres::Config {
    let mut postgres_config = postgres::Config::new();
    postgres_config.host(config.host.as_deref().unwrap_or(DEFAULT_POSTGRES_HOST));
    if let Some(port) = config.port {
        postgres_config.port(port);
    }
    if let Some(user) = &config.user {
        postgres_config.user(user);
    }
    if let Some(password) = &config.password {
        postgres_config.password(password);
    }
    postgres_config.dbname(&config.database);
    postgres_config.application_name("sqlrun");
    postgres_config
}

#[must_use]
pub fn describe_columns_query() -> &'static str {
    queries::TABLE_COLUMNS_QUERY
}

impl PostgresWarehouse {
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let mut client = client_config(config)
            .connect(NoTls)
            .map_err(|source| ExecutionError::connect(BACKEND_NAME, source))?;

        let raw_version = query_scalar(&mut client, queries::SHOW_SERVER_VERSION_QUERY)?;
        let server_version = parse_server_version(&raw_version).ok_or_else(|| {
            execution_error(
                queries::SHOW_SERVER_VERSION_QUERY,
                io::Error::other(format!(
                    "failed to parse postgres server version string: `{raw_version}`"
                )),
            )
        })?;
        ensure_minimum_version(server_version, &raw_version)?;

        if let Some(schema) = config.schema() {
            let sql = format!(
                "SET search_path TO {}",
                quote_identifier(&schema.to_lowercase())
            );
            client
                .batch_execute(&sql)
                .map_err(|source| execution_error(&sql, source))?;
        }
        debug!(version = %raw_version, schema = config.schema(), "connected to postgres warehouse");

        Ok(Self {
            client,
            server_version,
        })
    }

    #[must_use]
    pub const fn server_version(&self) -> (u16, u16) {
        self.server_version
    }
}

impl WarehouseClient for PostgresWarehouse {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn execute(&mut self, sql: &str) -> Result<QueryOutcome> {
        let messages = self
            .client
            .simple_query(sql)
            .map_err(|source| execution_error(sql, source))?;
        Ok(outcome_from_messages(messages))
    }

    fn describe_columns(&mut self, relation: &RelationName) -> Result<Vec<ColumnInfo>> {
        let (schema, name) = catalog_names(relation);
        let rows = self
            .client
            .query(queries::TABLE_COLUMNS_QUERY, &[&schema, &name])
            .map_err(|source| execution_error(queries::TABLE_COLUMNS_QUERY, source))?;
        rows.iter().map(decode_column_row).collect()
    }
}

/// Schema and table name as stored in the catalog. Relation names are written
/// unquoted, so postgres has folded them to lower case.
fn catalog_names(relation: &RelationName) -> (Option<String>, String) {
    (
        relation.schema.as_deref().map(str::to_lowercase),
        relation.name.to_lowercase(),
    )
}

/// Folds the messages of a single simple-protocol statement into an outcome.
/// A row description marks a result set even when it carries no rows.
fn outcome_from_messages(messages: Vec<SimpleQueryMessage>) -> QueryOutcome {
    let mut table: Option<ResultTable> = None;

    for message in messages {
        match message {
            SimpleQueryMessage::RowDescription(columns) => {
                table = Some(ResultTable::new(
                    columns
                        .iter()
                        .map(|column| column.name().to_string())
                        .collect(),
                ));
            }
            SimpleQueryMessage::Row(row) => {
                let values = (0..row.len())
                    .map(|index| Value::from_text(row.get(index)))
                    .collect::<Vec<_>>();
                let table = table.get_or_insert_with(|| {
                    ResultTable::new(
                        row.columns()
                            .iter()
                            .map(|column| column.name().to_string())
                            .collect(),
                    )
                });
                table.push_row(values);
            }
            _ => {}
        }
    }

    table.map_or(QueryOutcome::Acknowledged, QueryOutcome::Rows)
}

fn decode_column_row(row: &Row) -> Result<ColumnInfo> {
    let ordinal: i32 = row_value(row, "ordinal_position")?;
    Ok(ColumnInfo {
        name: row_value(row, "column_name")?,
        data_type: row_value(row, "data_type")?,
        nullable: row_value(row, "nullable")?,
        ordinal: usize::try_from(ordinal).unwrap_or_default(),
    })
}

fn row_value<T>(row: &Row, column: &str) -> Result<T>
where
    T: FromSqlOwned,
{
    row.try_get(column)
        .map_err(|source| execution_error(queries::TABLE_COLUMNS_QUERY, source))
}

fn query_scalar(client: &mut Client, sql: &str) -> Result<String> {
    let row = client
        .query_one(sql, &[])
        .map_err(|source| execution_error(sql, source))?;
    row.try_get::<_, String>(0)
        .map_err(|source| execution_error(sql, source))
}

pub(crate) fn parse_server_version(raw: &str) -> Option<(u16, u16)> {
    let mut parts = raw.split_whitespace().next()?.split('.');
    let major = parse_version_component(parts.next()?)?;
    let minor = parts.next().and_then(parse_version_component).unwrap_or(0);
    Some((major, minor))
}

fn parse_version_component(raw: &str) -> Option<u16> {
    let digits = raw
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .collect::<String>();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u16>().ok()
}

fn ensure_minimum_version(version: (u16, u16), raw_version: &str) -> Result<()> {
    if version.0 >= MINIMUM_POSTGRES_MAJOR_VERSION {
        return Ok(());
    }

    Err(execution_error(
        queries::SHOW_SERVER_VERSION_QUERY,
        io::Error::other(format!(
            "postgres server version `{raw_version}` is not supported; requires {MINIMUM_POSTGRES_MAJOR_VERSION}+"
        )),
    ))
}

fn execution_error<E>(sql: &str, source: E) -> sqlrun_core::Error
where
    E: StdError + Send + Sync + 'static,
{
    ExecutionError::statement_failed(0, sql, 0, source).into()
}
