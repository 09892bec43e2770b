use std::{io, path::PathBuf};

use miette::Report;
#[cfg(not(all(feature = "sqlite", feature = "postgres")))]
use sqlrun_core::Backend;
use sqlrun_core::Error;

const FILE_READ_CONTEXT: &str = "while reading SQL file";
const CONFIG_CONTEXT: &str = "while reading configuration";

pub(crate) const EXIT_RUNTIME: u8 = 1;
pub(crate) const EXIT_USAGE: u8 = 2;

pub(crate) type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug)]
pub(crate) enum CliError {
    ReadFile { path: PathBuf, source: io::Error },
    Core(Error),
    #[cfg(not(all(feature = "sqlite", feature = "postgres")))]
    BackendDisabled(Backend),
}

impl From<Error> for CliError {
    fn from(value: Error) -> Self {
        Self::Core(value)
    }
}

impl CliError {
    pub(crate) fn exit_code(&self) -> u8 {
        match self {
            Self::Core(Error::Config(_)) => EXIT_USAGE,
            #[cfg(not(all(feature = "sqlite", feature = "postgres")))]
            Self::BackendDisabled(_) => EXIT_USAGE,
            Self::ReadFile { .. } | Self::Core(_) => EXIT_RUNTIME,
        }
    }
}

/// One-line `[category] context: message` rendering for stderr.
pub(crate) fn render_runtime_error(error: CliError, command: &str) -> String {
    match error {
        CliError::ReadFile { path, source } => {
            let context = format!("{FILE_READ_CONTEXT} `{}`", path.display());
            let report = report_with_context(source, context);
            format!("[io] {report}")
        }
        CliError::Core(source) => {
            let category = core_category(&source);
            let context = match &source {
                Error::Config(_) => CONFIG_CONTEXT.to_string(),
                _ => format!("while running `sqlrun {command}`"),
            };
            let report = report_with_context(source, context);
            format!("[{category}] {report}")
        }
        #[cfg(not(all(feature = "sqlite", feature = "postgres")))]
        CliError::BackendDisabled(backend) => format!(
            "[config] backend `{}` is not enabled in this build; rebuild with the `{}` feature",
            backend.name(),
            backend.name()
        ),
    }
}

fn report_with_context<E, C>(source: E, context: C) -> Report
where
    E: std::error::Error + Send + Sync + 'static,
    C: Into<String>,
{
    let context = context.into();
    let anyhow_error = anyhow::Error::new(source).context(context);
    miette::miette!("{anyhow_error:#}")
}

fn core_category(error: &Error) -> &'static str {
    match error {
        Error::Config(_) => "config",
        Error::Execute(_) => "execute",
        Error::Report(_) => "report",
        Error::Output(_) => "io",
    }
}

#[cfg(test)]
mod tests {
    use std::{io, path::PathBuf};

    use sqlrun_core::{ConfigError, Error, ExecutionError};

    use super::{CliError, EXIT_RUNTIME, EXIT_USAGE, render_runtime_error};

    #[test]
    fn missing_settings_are_usage_errors() {
        let error = CliError::from(Error::from(ConfigError::MissingVariables {
            names: vec!["SQLRUN_DATABASE".to_string()],
        }));

        assert_eq!(error.exit_code(), EXIT_USAGE);
        let rendered = render_runtime_error(error, "run");
        assert_eq!(
            rendered,
            "[config] while reading configuration: missing required environment variables: SQLRUN_DATABASE"
        );
    }

    #[test]
    fn statement_failures_keep_the_execute_category() {
        let error = CliError::from(Error::from(ExecutionError::statement_failed(
            3,
            "SELECT nope",
            2,
            io::Error::other("no such column: nope"),
        )));

        assert_eq!(error.exit_code(), EXIT_RUNTIME);
        let rendered = render_runtime_error(error, "run");
        assert!(rendered.starts_with("[execute] while running `sqlrun run`: statement[3]"));
        assert!(rendered.contains("no such column: nope"));
    }

    #[test]
    fn unreadable_files_name_the_path() {
        let error = CliError::ReadFile {
            path: PathBuf::from("queries/missing.sql"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };

        let rendered = render_runtime_error(error, "run");
        assert!(rendered.starts_with("[io] while reading SQL file `queries/missing.sql`"));
    }
}
