use crate::{RelationName, Result, ResultTable};

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// The statement produced no result set (DDL, DML, SET).
    Acknowledged,
    Rows(ResultTable),
}

impl QueryOutcome {
    #[must_use]
    pub fn into_rows(self) -> Option<ResultTable> {
        match self {
            Self::Acknowledged => None,
            Self::Rows(table) => Some(table),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    /// 1-based position in the relation.
    pub ordinal: usize,
}

pub trait WarehouseClient {
    fn backend_name(&self) -> &'static str;

    fn execute(&mut self, sql: &str) -> Result<QueryOutcome>;

    /// Columns of `relation` ordered by ordinal position; empty when the
    /// relation does not exist.
    fn describe_columns(&mut self, relation: &RelationName) -> Result<Vec<ColumnInfo>>;
}

impl<C> WarehouseClient for Box<C>
where
    C: WarehouseClient + ?Sized,
{
    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }

    fn execute(&mut self, sql: &str) -> Result<QueryOutcome> {
        (**self).execute(sql)
    }

    fn describe_columns(&mut self, relation: &RelationName) -> Result<Vec<ColumnInfo>> {
        (**self).describe_columns(relation)
    }
}
