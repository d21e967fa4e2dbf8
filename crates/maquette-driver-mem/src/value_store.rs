use maquette_core::stmt::{Row, Value};

use std::collections::{BTreeMap, HashMap};

/// Table storage: rows keyed and ordered by primary key.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    tables: HashMap<String, BTreeMap<Value, Row>>,
}

impl Tables {
    pub(crate) fn entry(&mut self, table: String) -> &mut BTreeMap<Value, Row> {
        self.tables.entry(table).or_default()
    }

    pub(crate) fn get(&self, table: &str) -> Option<&BTreeMap<Value, Row>> {
        self.tables.get(table)
    }

    pub(crate) fn get_mut(&mut self, table: &str) -> Option<&mut BTreeMap<Value, Row>> {
        self.tables.get_mut(table)
    }
}
