use sqlrun_core::{ConnectionConfig, WarehouseClient};
use tracing::info;

#[cfg(not(all(feature = "sqlite", feature = "postgres")))]
use crate::error_presentation::CliError;
use crate::error_presentation::CliResult;

/// Reads `SQLRUN_*` settings and opens the configured warehouse.
pub(crate) fn connect_from_env() -> CliResult<Box<dyn WarehouseClient>> {
    let config = ConnectionConfig::from_env().map_err(sqlrun_core::Error::from)?;
    info!(
        backend = config.backend.name(),
        database = %config.database,
        "connecting"
    );
    connect(&config)
}

fn connect(config: &ConnectionConfig) -> CliResult<Box<dyn WarehouseClient>> {
    match config.backend {
        #[cfg(feature = "sqlite")]
        sqlrun_core::Backend::Sqlite => Ok(sqlrun_warehouse_sqlite::connect(config)?),
        #[cfg(feature = "postgres")]
        sqlrun_core::Backend::Postgres => Ok(sqlrun_warehouse_postgres::connect(config)?),
        #[cfg(not(all(feature = "sqlite", feature = "postgres")))]
        other => Err(CliError::BackendDisabled(other)),
    }
}
