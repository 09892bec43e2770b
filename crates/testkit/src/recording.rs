use sqlrun_core::{ColumnInfo, QueryOutcome, RelationName, Result, WarehouseClient};

/// Wraps a real client and keeps every statement it was asked to run.
pub struct RecordingWarehouse<C> {
    inner: C,
    executed: Vec<String>,
}

impl<C> RecordingWarehouse<C>
where
    C: WarehouseClient,
{
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            executed: Vec::new(),
        }
    }

    #[must_use]
    pub fn executed_sql(&self) -> &[String] {
        &self.executed
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C> WarehouseClient for RecordingWarehouse<C>
where
    C: WarehouseClient,
{
    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }

    fn execute(&mut self, sql: &str) -> Result<QueryOutcome> {
        self.executed.push(sql.to_string());
        self.inner.execute(sql)
    }

    fn describe_columns(&mut self, relation: &RelationName) -> Result<Vec<ColumnInfo>> {
        self.inner.describe_columns(relation)
    }
}
