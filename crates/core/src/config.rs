use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::{ConfigError, relation::quote_literal};

pub const ENV_BACKEND: &str = "SQLRUN_BACKEND";
pub const ENV_DATABASE: &str = "SQLRUN_DATABASE";
pub const ENV_HOST: &str = "SQLRUN_HOST";
pub const ENV_PORT: &str = "SQLRUN_PORT";
pub const ENV_USER: &str = "SQLRUN_USER";
pub const ENV_PASSWORD: &str = "SQLRUN_PASSWORD";
pub const ENV_SCHEMA: &str = "SQLRUN_SCHEMA";

pub const SCHEMA_EXTRA_KEY: &str = "schema";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Sqlite,
    Postgres,
}

impl Backend {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
        }
    }

    const fn requires_credentials(self) -> bool {
        matches!(self, Self::Postgres)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            _ => Err(ConfigError::InvalidValue {
                name: ENV_BACKEND.to_string(),
                value: raw.to_string(),
                reason: "expected `sqlite` or `postgres`".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub backend: Backend,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: String,
    pub extra: BTreeMap<String, String>,
}

impl ConnectionConfig {
    #[must_use]
    pub fn new(backend: Backend, database: impl Into<String>) -> Self {
        Self {
            backend,
            host: None,
            port: None,
            user: None,
            password: None,
            database: database.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from a variable lookup. Every missing required variable
    /// is reported in a single error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let backend = read(ENV_BACKEND)
            .map(|raw| raw.parse::<Backend>())
            .transpose()?
            .unwrap_or_default();

        let database = read(ENV_DATABASE);
        let user = read(ENV_USER);
        let password = read(ENV_PASSWORD);

        let mut missing = Vec::new();
        if database.is_none() {
            missing.push(ENV_DATABASE.to_string());
        }
        if backend.requires_credentials() {
            if user.is_none() {
                missing.push(ENV_USER.to_string());
            }
            if password.is_none() {
                missing.push(ENV_PASSWORD.to_string());
            }
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables { names: missing });
        }

        let port = read(ENV_PORT)
            .map(|raw| {
                raw.trim()
                    .parse::<u16>()
                    .map_err(|error| ConfigError::InvalidValue {
                        name: ENV_PORT.to_string(),
                        value: raw.clone(),
                        reason: error.to_string(),
                    })
            })
            .transpose()?;

        let mut extra = BTreeMap::new();
        if let Some(schema) = read(ENV_SCHEMA) {
            extra.insert(SCHEMA_EXTRA_KEY.to_string(), schema);
        }

        Ok(Self {
            backend,
            host: read(ENV_HOST),
            port,
            user,
            password,
            database: database.unwrap_or_default(),
            extra,
        })
    }

    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.extra.get(SCHEMA_EXTRA_KEY).map(String::as_str)
    }
}

/// A `NAME=VALUE` session variable applied before a script runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOverride {
    pub name: String,
    pub value: String,
}

impl SessionOverride {
    /// The value is always sent as a string literal; the warehouse casts it
    /// where the script expects a number.
    #[must_use]
    pub fn to_sql(&self) -> String {
        format!("SET {} = {}", self.name, quote_literal(&self.value))
    }
}

impl FromStr for SessionOverride {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidOverride {
            raw: raw.to_string(),
        };
        let (name, value) = raw.split_once('=').ok_or_else(invalid)?;
        let name = name.trim();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        Ok(Self {
            name: name.to_string(),
            value: value.trim().to_string(),
        })
    }
}

/// The slice of a script to execute, by 1-based statement index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementWindow {
    start_at: usize,
    max_statements: Option<usize>,
}

impl Default for StatementWindow {
    fn default() -> Self {
        Self::new(1, None)
    }
}

impl StatementWindow {
    /// `start_at` values below 1 are treated as 1.
    #[must_use]
    pub fn new(start_at: usize, max_statements: Option<usize>) -> Self {
        Self {
            start_at: start_at.max(1),
            max_statements,
        }
    }

    #[must_use]
    pub const fn start_at(&self) -> usize {
        self.start_at
    }

    /// Last index included, if bounded. A bound past `usize::MAX` is no bound.
    #[must_use]
    pub fn end_at(&self) -> Option<usize> {
        self.max_statements
            .and_then(|max| self.start_at.checked_add(max))
            .map(|end| end - 1)
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_at && self.end_at().is_none_or(|end| index <= end)
    }
}
