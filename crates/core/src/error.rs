use std::{error::Error as StdError, io, path::PathBuf};

use thiserror::Error as ThisError;

pub type BoxedError = Box<dyn StdError + Send + Sync>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Execute(#[from] ExecutionError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", names.join(", "))]
    MissingVariables { names: Vec<String> },
    #[error("invalid value `{value}` for {name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
    #[error("invalid session override `{raw}`: expected NAME=VALUE")]
    InvalidOverride { raw: String },
    #[error("invalid relation name `{raw}`: expected [database.][schema.]name")]
    InvalidRelation { raw: String },
}

#[derive(Debug, ThisError)]
pub enum ExecutionError {
    #[error("failed to connect to {backend} warehouse: {source}")]
    Connect {
        backend: String,
        #[source]
        source: BoxedError,
    },
    #[error(
        "statement[{statement_index}] failed after {executed_statements} executed statements: {source}\n  sql: {sql}"
    )]
    StatementFailed {
        statement_index: usize,
        sql: String,
        executed_statements: usize,
        #[source]
        source: BoxedError,
    },
}

impl ExecutionError {
    pub fn connect<E>(backend: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Connect {
            backend: backend.into(),
            source: Box::new(source),
        }
    }

    pub fn statement_failed<E>(
        statement_index: usize,
        sql: impl Into<String>,
        executed_statements: usize,
        source: E,
    ) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::StatementFailed {
            statement_index,
            sql: sql.into(),
            executed_statements,
            source: Box::new(source),
        }
    }

    /// Re-labels a failure reported by a client with the caller's view of the script position.
    #[must_use]
    pub fn at_position(self, index: usize, executed: usize) -> Self {
        match self {
            Self::StatementFailed { sql, source, .. } => Self::StatementFailed {
                statement_index: index,
                sql,
                executed_statements: executed,
                source,
            },
            other => other,
        }
    }
}

#[derive(Debug, ThisError)]
pub enum ReportError {
    #[error("no columns found for relation `{relation}`")]
    EmptyRelation { relation: String },
    #[error("result set is missing expected column `{column}`")]
    MissingColumn { column: String },
    #[error("unexpected value `{value}` in column `{column}`")]
    UnexpectedValue { column: String, value: String },
    #[error("statement returned no result set: {sql}")]
    NoResultSet { sql: String },
    #[error("sample source `{needle}` not found in script")]
    SampleSourceNotFound { needle: String },
    #[error("failed to access `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ReportError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
