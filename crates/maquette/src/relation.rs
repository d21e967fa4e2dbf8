use crate::{
    instance::{AssocState, Instance},
    session::Session,
};

use maquette_core::{
    driver::operation,
    schema::NotFound,
    Error, Result,
};

use std::sync::Arc;

impl Session {
    /// Resolve an owning to-one association.
    ///
    /// The first call loads the target through the identity map and caches
    /// the outcome on the instance; later calls return the cached target
    /// without touching the row source. A null foreign key short-circuits to
    /// `None`. A non-null key whose target row is gone follows the
    /// association's not-found policy: `Ignore` caches `None`, `Exception`
    /// signals a dangling reference and leaves the slot unresolved.
    pub async fn fetch_one(
        &self,
        owner: &Arc<Instance>,
        field: &str,
    ) -> Result<Option<Arc<Instance>>> {
        let entity = self.registry.entity(owner.entity())?;
        let schema_field = entity
            .field(field)
            .ok_or_else(|| Error::unknown_field(&entity.name, field))?;
        let rel = schema_field.ty.as_belongs_to().ok_or_else(|| {
            Error::invalid_result(format!(
                "`{}.{field}` is not a to-one association",
                entity.name
            ))
        })?;

        let key = match owner.assoc(field) {
            Some(AssocState::One(target)) => return Ok(target),
            Some(AssocState::Raw(key)) => key,
            _ => {
                return Err(Error::invalid_result(format!(
                    "`{}.{field}` is not a to-one association",
                    entity.name
                )))
            }
        };

        if key.is_null() {
            owner.store_assoc(field, AssocState::One(None));
            return Ok(None);
        }

        match self.find_by_key(&rel.target, &key).await? {
            Some(target) => {
                owner.store_assoc(field, AssocState::One(Some(target.clone())));
                Ok(Some(target))
            }
            None => match rel.not_found {
                NotFound::Ignore => {
                    owner.store_assoc(field, AssocState::One(None));
                    Ok(None)
                }
                NotFound::Exception => Err(Error::dangling_reference(&rel.target, key)),
            },
        }
    }

    /// Resolve an inverse to-many association.
    ///
    /// The first call fetches the collection in ascending identifier order
    /// and caches it on the instance; later calls return the cached
    /// collection.
    pub async fn fetch_many(
        &self,
        owner: &Arc<Instance>,
        field: &str,
    ) -> Result<Vec<Arc<Instance>>> {
        let entity = self.registry.entity(owner.entity())?;
        let schema_field = entity
            .field(field)
            .ok_or_else(|| Error::unknown_field(&entity.name, field))?;
        let rel = schema_field.ty.as_has_many().ok_or_else(|| {
            Error::invalid_result(format!(
                "`{}.{field}` is not a collection",
                entity.name
            ))
        })?;

        match owner.assoc(field) {
            Some(AssocState::Many(targets)) => return Ok(targets),
            Some(AssocState::Unloaded) => {}
            _ => {
                return Err(Error::invalid_result(format!(
                    "`{}.{field}` is not a collection",
                    entity.name
                )))
            }
        }

        let target = self.registry.entity(&rel.target)?;
        let pair = target.field(&rel.pair).ok_or_else(|| {
            Error::unknown_field(&target.name, &rel.pair)
        })?;
        let join_column = pair.column().ok_or_else(|| {
            Error::invalid_result(format!(
                "`{}.{}` has no join column",
                target.name, rel.pair
            ))
        })?;

        let response = self
            .exec(
                operation::QueryTable {
                    table: target.table.clone(),
                    filter: Some(operation::Filter {
                        column: join_column.to_string(),
                        value: owner.id().clone(),
                    }),
                }
                .into(),
            )
            .await?;

        let rows = response.rows.into_values()?.collect().await?;
        let targets = self.materialize_rows(target, rows).await?;

        owner.store_assoc(field, AssocState::Many(targets.clone()));
        Ok(targets)
    }
}
