use crate::stmt::{Row, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Insert one or more rows.
    Insert(Insert),

    /// Get a single row by primary key.
    GetByKey(GetByKey),

    /// Scan a table, optionally filtered on one column.
    QueryTable(QueryTable),

    /// Delete a row by primary key.
    DeleteByKey(DeleteByKey),

    /// Execute a transaction lifecycle op.
    Transaction(Transaction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insert {
    pub table: String,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetByKey {
    pub table: String,
    pub key: Value,
}

/// Results are returned in ascending primary-key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTable {
    pub table: String,
    pub filter: Option<Filter>,
}

/// Equality filter on a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteByKey {
    pub table: String,
    pub key: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    Start,
    Commit,
    Rollback,
}

impl From<Insert> for Operation {
    fn from(value: Insert) -> Self {
        Self::Insert(value)
    }
}

impl From<GetByKey> for Operation {
    fn from(value: GetByKey) -> Self {
        Self::GetByKey(value)
    }
}

impl From<QueryTable> for Operation {
    fn from(value: QueryTable) -> Self {
        Self::QueryTable(value)
    }
}

impl From<DeleteByKey> for Operation {
    fn from(value: DeleteByKey) -> Self {
        Self::DeleteByKey(value)
    }
}

impl From<Transaction> for Operation {
    fn from(value: Transaction) -> Self {
        Self::Transaction(value)
    }
}
