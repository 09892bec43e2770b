mod adapter;
mod config;
mod error;
mod executor;
pub mod materialize;
mod relation;
pub mod renderer;
pub mod report;
mod statement;
mod table;

pub use adapter::{ColumnInfo, QueryOutcome, WarehouseClient};
pub use config::{
    Backend, ConnectionConfig, ENV_BACKEND, ENV_DATABASE, ENV_HOST, ENV_PASSWORD, ENV_PORT,
    ENV_SCHEMA, ENV_USER, SessionOverride, StatementWindow,
};
pub use error::{BoxedError, ConfigError, Error, ExecutionError, ReportError, Result};
pub use executor::{DEFAULT_MAX_ROWS, Executor, RunOptions, RunSummary};
pub use relation::{RelationName, quote_identifier, quote_literal};
pub use statement::{
    STATEMENT_SEPARATOR, Statement, split_segments, split_statements, strip_trailing_terminator,
};
pub use table::{ResultTable, Value};
