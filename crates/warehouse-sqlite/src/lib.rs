mod adapter;
mod queries;

pub use adapter::{SqliteWarehouse, connect};
