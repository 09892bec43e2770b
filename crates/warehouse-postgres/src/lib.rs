mod adapter;
mod queries;

pub use adapter::{PostgresWarehouse, client_config, connect, describe_columns_query};
