mod value_store;
use value_store::Tables;

use maquette_core::{
    async_trait,
    driver::{operation, Connection, Driver, Operation, Response},
    schema::Registry,
    stmt::RowStream,
    Error, Result,
};

use anyhow::anyhow;
use std::{
    borrow::Cow,
    sync::{Arc, Mutex},
};
use url::Url;

/// In-memory row source with snapshot transactions.
///
/// Rows are kept per table, keyed and ordered by primary key, so scans come
/// back in ascending key order. `Transaction::Start` snapshots the tables;
/// `Rollback` restores the snapshot and `Commit` discards it.
#[derive(Debug, Clone)]
pub struct Memory {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    tables: Tables,
    snapshot: Option<Tables>,
}

impl Memory {
    /// Create a driver from a `mem://` connection URL.
    pub fn new(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(Error::driver)?;

        if parsed.scheme() != "mem" {
            return Err(Error::driver(anyhow!(
                "connection URL does not have a `mem` scheme; url={url}"
            )));
        }

        Ok(Self::in_memory())
    }

    pub fn in_memory() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[async_trait]
impl Driver for Memory {
    fn url(&self) -> Cow<'_, str> {
        "mem://".into()
    }

    async fn connect(&self) -> Result<Box<dyn Connection>> {
        Ok(Box::new(MemoryConnection {
            state: self.state.clone(),
        }))
    }
}

#[derive(Debug)]
struct MemoryConnection {
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn exec(&mut self, registry: &Arc<Registry>, op: Operation) -> Result<Response> {
        let mut state = self.state.lock().map_err(|_| {
            Error::driver(anyhow!("state lock poisoned"))
        })?;

        match op {
            Operation::Insert(op) => state.insert(op),
            Operation::GetByKey(op) => state.get_by_key(op),
            Operation::QueryTable(op) => state.query_table(registry, op),
            Operation::DeleteByKey(op) => state.delete_by_key(op),
            Operation::Transaction(op) => state.transaction(op),
        }
    }
}

impl State {
    fn insert(&mut self, op: operation::Insert) -> Result<Response> {
        let table = self.tables.entry(op.table);
        let mut count = 0;

        for row in op.rows {
            let key = row
                .key()
                .cloned()
                .ok_or_else(|| Error::driver(anyhow!("insert row without a key column")))?;

            if table.contains_key(&key) {
                return Err(Error::driver(anyhow!(
                    "duplicate primary key; key={key}"
                )));
            }

            table.insert(key, row);
            count += 1;
        }

        Ok(Response::count(count))
    }

    fn get_by_key(&self, op: operation::GetByKey) -> Result<Response> {
        let rows = match self.tables.get(&op.table).and_then(|t| t.get(&op.key)) {
            Some(row) => vec![row.clone()],
            None => vec![],
        };

        Ok(Response::rows(RowStream::from_vec(rows)))
    }

    fn query_table(&self, registry: &Arc<Registry>, op: operation::QueryTable) -> Result<Response> {
        let Some(table) = self.tables.get(&op.table) else {
            return Ok(Response::rows(RowStream::from_vec(vec![])));
        };

        let rows: Vec<_> = match &op.filter {
            Some(filter) => {
                let entity = registry.entity_for_table(&op.table)?;
                let index = entity.column_index(&filter.column).ok_or_else(|| {
                    Error::driver(anyhow!(
                        "unknown column `{}` on table `{}`",
                        filter.column,
                        op.table
                    ))
                })?;

                table
                    .values()
                    .filter(|row| row.get(index) == Some(&filter.value))
                    .cloned()
                    .collect()
            }
            None => table.values().cloned().collect(),
        };

        Ok(Response::rows(RowStream::from_vec(rows)))
    }

    fn delete_by_key(&mut self, op: operation::DeleteByKey) -> Result<Response> {
        let removed = self
            .tables
            .get_mut(&op.table)
            .map_or(false, |table| table.remove(&op.key).is_some());

        Ok(Response::count(removed as u64))
    }

    fn transaction(&mut self, op: operation::Transaction) -> Result<Response> {
        use operation::Transaction::*;

        match op {
            Start => {
                if self.snapshot.is_some() {
                    return Err(Error::driver(anyhow!("transaction already in progress")));
                }
                self.snapshot = Some(self.tables.clone());
            }
            Commit => {
                if self.snapshot.take().is_none() {
                    return Err(Error::driver(anyhow!("no transaction in progress")));
                }
            }
            Rollback => {
                let Some(snapshot) = self.snapshot.take() else {
                    return Err(Error::driver(anyhow!("no transaction in progress")));
                };
                self.tables = snapshot;
            }
        }

        Ok(Response::empty())
    }
}
