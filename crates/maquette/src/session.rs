use crate::{
    identity_map::IdentityMap,
    instance::{Draft, Instance, Ref},
    query::{self, Query},
};

use maquette_core::{
    driver::{operation, Connection, Operation, Response},
    schema::{Entity, FieldTy, Registry},
    stmt::{Row, Value},
    Error, Result,
};

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};
use tokio::sync::Mutex;

/// A reactive session bound to one transaction scope.
///
/// All operations complete asynchronously over the transaction's pinned
/// connection; nothing blocks the calling thread. Cheap to clone: clones
/// share the connection and the identity map.
#[derive(Clone)]
pub struct Session {
    pub(crate) registry: Arc<Registry>,
    conn: Arc<Mutex<Box<dyn Connection>>>,
    pub(crate) identity: Arc<IdentityMap>,
}

impl Session {
    pub(crate) fn new(registry: Arc<Registry>, conn: Arc<Mutex<Box<dyn Connection>>>) -> Self {
        Self {
            registry,
            conn,
            identity: Arc::new(IdentityMap::new()),
        }
    }

    pub(crate) async fn exec(&self, op: Operation) -> Result<Response> {
        tracing::debug!(?op, "exec");
        let mut conn = self.conn.lock().await;
        conn.exec(&self.registry, op).await
    }

    /// Build a restricted query (`from Entity [where field = literal]`).
    /// Run it with [`Query::all`] or [`Query::single`].
    pub fn query(&self, text: &str) -> Query<'_> {
        Query::new(self, text)
    }

    pub(crate) async fn query_all(&self, text: &str) -> Result<Vec<Arc<Instance>>> {
        let parsed = query::parse(text)?;
        let entity = self.registry.entity(&parsed.entity)?;

        let filter = match &parsed.filter {
            Some((field_name, value)) => {
                let column = self.filter_column(entity, field_name)?;
                Some(operation::Filter {
                    column: column.to_string(),
                    value: value.clone(),
                })
            }
            None => None,
        };

        let response = self
            .exec(
                operation::QueryTable {
                    table: entity.table.clone(),
                    filter,
                }
                .into(),
            )
            .await?;

        let rows = response.rows.into_values()?.collect().await?;
        self.materialize_rows(entity, rows).await
    }

    /// Single-row lookup by primary key through the identity map.
    pub async fn find(&self, entity: &str, id: impl Into<Value>) -> Result<Option<Arc<Instance>>> {
        let id = id.into();
        self.find_by_key(entity, &id).await
    }

    pub(crate) async fn find_by_key(
        &self,
        entity_name: &str,
        id: &Value,
    ) -> Result<Option<Arc<Instance>>> {
        let entity = self.registry.entity(entity_name)?;

        self.identity
            .get_or_create(entity_name, id, || async {
                let response = self
                    .exec(
                        operation::GetByKey {
                            table: entity.table.clone(),
                            key: id.clone(),
                        }
                        .into(),
                    )
                    .await?;

                let rows = response.rows.into_values()?.collect().await?;
                match rows.into_iter().next() {
                    Some(row) => Instance::materialize(entity, row).map(Some),
                    None => Ok(None),
                }
            })
            .await
    }

    /// Materialize driver rows through the identity map, preserving row
    /// order.
    pub(crate) async fn materialize_rows(
        &self,
        entity: &Entity,
        rows: Vec<Row>,
    ) -> Result<Vec<Arc<Instance>>> {
        let mut out = Vec::with_capacity(rows.len());

        for row in rows {
            let id = row
                .key()
                .cloned()
                .ok_or_else(|| Error::invalid_result("row without a key column"))?;

            let instance = self
                .identity
                .get_or_create(&entity.name, &id, || async {
                    Instance::materialize(entity, row).map(Some)
                })
                .await?
                .ok_or_else(|| {
                    Error::invalid_result("identity entry absent for a materialized row")
                })?;

            out.push(instance);
        }

        Ok(out)
    }

    /// Persist a batch of drafts.
    ///
    /// Inserts are ordered so that every non-null many-to-one target in the
    /// batch is inserted before its dependent; foreign-key dependency cycles
    /// are rejected. Nullability of owning associations is validated before
    /// any insert is issued.
    pub async fn persist_all(&self, drafts: Vec<Draft>) -> Result<()> {
        let rows: Vec<(String, Row)> = drafts
            .iter()
            .map(|draft| {
                let entity = self.registry.entity(draft.entity())?;
                Ok((entity.table.clone(), self.draft_row(entity, draft)?))
            })
            .collect::<Result<_>>()?;

        for index in self.insert_order(&drafts)? {
            let (table, row) = rows[index].clone();
            let response = self
                .exec(
                    operation::Insert {
                        table,
                        rows: vec![row],
                    }
                    .into(),
                )
                .await?;
            response.rows.into_count()?;
        }

        Ok(())
    }

    /// Delete by primary key. No cascade: dangling foreign keys in other
    /// rows are left intact.
    pub async fn remove(&self, reference: &Ref) -> Result<()> {
        let entity = self.registry.entity(reference.entity())?;

        let response = self
            .exec(
                operation::DeleteByKey {
                    table: entity.table.clone(),
                    key: reference.id().clone(),
                }
                .into(),
            )
            .await?;

        if response.rows.into_count()? == 0 {
            return Err(Error::record_not_found(format!(
                "`{}` key={} has no row to remove",
                reference.entity(),
                reference.id()
            )));
        }

        self.identity.remove(reference.entity(), reference.id()).await;
        Ok(())
    }

    /// Identifier-only handle for an instance, without issuing a query.
    pub fn get_reference(&self, instance: &Instance) -> Ref {
        Ref::new(instance.entity(), instance.id().clone())
    }

    /// Map a filter field to its column. The identifier, scalar fields, and
    /// owning-side join columns are filterable; collections are not.
    fn filter_column<'a>(&self, entity: &'a Entity, field_name: &str) -> Result<&'a str> {
        if field_name == entity.id_field {
            return Ok(&entity.id_field);
        }

        let field = entity
            .field(field_name)
            .ok_or_else(|| Error::unknown_field(&entity.name, field_name))?;

        field.column().ok_or_else(|| {
            Error::query_syntax(format!(
                "cannot filter on collection field `{field_name}`"
            ))
        })
    }

    /// Build a row from a draft, validating field names and nullability.
    fn draft_row(&self, entity: &Entity, draft: &Draft) -> Result<Row> {
        for name in draft.field_names() {
            if name == entity.id_field {
                continue;
            }
            let field = entity
                .field(name)
                .ok_or_else(|| Error::unknown_field(&entity.name, name))?;
            if field.column().is_none() {
                return Err(Error::constraint_violation(format!(
                    "cannot assign collection field `{}.{name}`",
                    entity.name
                )));
            }
        }

        let id = draft.get(&entity.id_field).cloned().unwrap_or_default();
        if id.is_null() {
            return Err(Error::constraint_violation(format!(
                "`{}` requires an identifier",
                entity.name
            )));
        }

        let mut values = vec![id];
        for field in &entity.fields {
            match &field.ty {
                FieldTy::Scalar(_) => {
                    values.push(draft.get(&field.name).cloned().unwrap_or_default());
                }
                FieldTy::BelongsTo(rel) => {
                    let key = draft.get(&field.name).cloned().unwrap_or_default();
                    if key.is_null() && !rel.nullable {
                        return Err(Error::constraint_violation(format!(
                            "`{}.{}` must not be null",
                            entity.name, field.name
                        )));
                    }
                    values.push(key);
                }
                FieldTy::HasMany(_) => {}
            }
        }

        Ok(Row::from_vec(values))
    }

    /// Topological insert order by foreign-key dependency within the batch.
    fn insert_order(&self, drafts: &[Draft]) -> Result<Vec<usize>> {
        let mut by_key: HashMap<(&str, Value), usize> = HashMap::new();
        for (index, draft) in drafts.iter().enumerate() {
            let entity = self.registry.entity(draft.entity())?;
            let id = draft.get(&entity.id_field).cloned().unwrap_or_default();
            if by_key.insert((draft.entity(), id), index).is_some() {
                return Err(Error::constraint_violation(format!(
                    "batch contains `{}` twice under one identifier",
                    draft.entity()
                )));
            }
        }

        let mut dependents: Vec<Vec<usize>> = vec![vec![]; drafts.len()];
        let mut pending: Vec<usize> = vec![0; drafts.len()];

        for (index, draft) in drafts.iter().enumerate() {
            let entity = self.registry.entity(draft.entity())?;
            for field in &entity.fields {
                let FieldTy::BelongsTo(rel) = &field.ty else {
                    continue;
                };
                let key = draft.get(&field.name).cloned().unwrap_or_default();
                if key.is_null() {
                    continue;
                }
                if let Some(&target) = by_key.get(&(rel.target.as_str(), key)) {
                    dependents[target].push(index);
                    pending[index] += 1;
                }
            }
        }

        let mut queue: VecDeque<usize> = (0..drafts.len()).filter(|i| pending[*i] == 0).collect();
        let mut ordered = Vec::with_capacity(drafts.len());

        while let Some(index) = queue.pop_front() {
            ordered.push(index);
            for &dependent in &dependents[index] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        if ordered.len() != drafts.len() {
            return Err(Error::constraint_violation(
                "foreign-key dependency cycle in persist batch",
            ));
        }

        Ok(ordered)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("entities", &self.registry.entities().count())
            .finish()
    }
}
