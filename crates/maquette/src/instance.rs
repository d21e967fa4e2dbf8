use maquette_core::{
    schema::{Entity, FieldTy},
    stmt::{Row, Value},
    Error, Result,
};

use indexmap::IndexMap;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

/// A materialized entity instance.
///
/// Scalar field values are fixed at materialization. Association state lives
/// behind a mutex so a resolved target can be cached on the shared handle.
/// Resolved associations may form reference cycles (an artist's paintings
/// each point back at the artist); the graph is bounded by the transaction
/// scope that owns it.
#[derive(Debug)]
pub struct Instance {
    entity: String,
    id: Value,
    values: IndexMap<String, Value>,
    associations: Mutex<HashMap<String, AssocState>>,
}

/// State of one association slot on an instance.
#[derive(Debug, Clone)]
pub(crate) enum AssocState {
    /// Owning-side foreign key, not yet resolved.
    Raw(Value),

    /// Resolved to-one target.
    One(Option<Arc<Instance>>),

    /// Inverse-side collection, not yet fetched.
    Unloaded,

    /// Resolved collection, in ascending identifier order.
    Many(Vec<Arc<Instance>>),
}

impl Instance {
    /// Interpret a row against the entity's column layout.
    pub(crate) fn materialize(entity: &Entity, row: Row) -> Result<Self> {
        if row.len() != entity.row_width() {
            return Err(Error::invalid_result(format!(
                "row width {} does not match the layout of `{}` (expected {})",
                row.len(),
                entity.name,
                entity.row_width()
            )));
        }

        let mut columns = row.into_vec().into_iter();
        let id = columns.next().unwrap_or_default();

        let mut values = IndexMap::new();
        let mut associations = HashMap::new();

        for field in &entity.fields {
            match &field.ty {
                FieldTy::Scalar(_) => {
                    values.insert(field.name.clone(), columns.next().unwrap_or_default());
                }
                FieldTy::BelongsTo(_) => {
                    associations.insert(
                        field.name.clone(),
                        AssocState::Raw(columns.next().unwrap_or_default()),
                    );
                }
                FieldTy::HasMany(_) => {
                    associations.insert(field.name.clone(), AssocState::Unloaded);
                }
            }
        }

        Ok(Self {
            entity: entity.name.clone(),
            id,
            values,
            associations: Mutex::new(associations),
        })
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn id(&self) -> &Value {
        &self.id
    }

    /// Scalar field value, if the field exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub(crate) fn assoc(&self, field: &str) -> Option<AssocState> {
        self.associations
            .lock()
            .expect("lock poisoned")
            .get(field)
            .cloned()
    }

    pub(crate) fn store_assoc(&self, field: &str, state: AssocState) {
        self.associations
            .lock()
            .expect("lock poisoned")
            .insert(field.to_string(), state);
    }
}

/// Identifier-only handle to a persisted entity, obtained without I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref {
    entity: String,
    id: Value,
}

impl Ref {
    pub fn new(entity: impl Into<String>, id: impl Into<Value>) -> Self {
        Self {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn id(&self) -> &Value {
        &self.id
    }
}

/// Field values for an entity awaiting persist.
///
/// Owning associations are set by assigning the target's identifier to the
/// association field; collection fields cannot be assigned.
#[derive(Debug, Clone)]
pub struct Draft {
    entity: String,
    values: IndexMap<String, Value>,
}

impl Draft {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            values: IndexMap::new(),
        }
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub(crate) fn field_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
