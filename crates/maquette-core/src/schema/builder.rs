use super::{Entity, FieldTy, Registry};
use crate::{Error, Result};

use indexmap::IndexMap;

/// Builds a [`Registry`], cross-validating association targets and pairs.
#[derive(Debug, Default)]
pub struct Builder {
    entities: IndexMap<String, Entity>,
}

impl Builder {
    /// Register an entity descriptor. Fails if the name is already taken.
    pub fn register(&mut self, entity: Entity) -> Result<&mut Self> {
        if self.entities.contains_key(&entity.name) {
            return Err(Error::duplicate_entity(&entity.name));
        }

        self.entities.insert(entity.name.clone(), entity);
        Ok(self)
    }

    pub fn build(self) -> Result<Registry> {
        for entity in self.entities.values() {
            if entity.fields.iter().any(|f| f.name == entity.id_field) {
                return Err(Error::invalid_schema(format!(
                    "entity `{}` declares a field shadowing its identifier `{}`",
                    entity.name, entity.id_field
                )));
            }

            for field in &entity.fields {
                match &field.ty {
                    FieldTy::Scalar(_) => {}
                    FieldTy::BelongsTo(rel) => {
                        if !self.entities.contains_key(&rel.target) {
                            return Err(Error::unknown_entity(&rel.target));
                        }
                    }
                    FieldTy::HasMany(rel) => {
                        let target = self
                            .entities
                            .get(&rel.target)
                            .ok_or_else(|| Error::unknown_entity(&rel.target))?;

                        let pair = target.field(&rel.pair).ok_or_else(|| {
                            Error::invalid_schema(format!(
                                "`{}.{}` pairs with `{}.{}`, which does not exist",
                                entity.name, field.name, rel.target, rel.pair
                            ))
                        })?;

                        let owning = pair.ty.as_belongs_to().ok_or_else(|| {
                            Error::invalid_schema(format!(
                                "`{}.{}` pairs with `{}.{}`, which is not an owning association",
                                entity.name, field.name, rel.target, rel.pair
                            ))
                        })?;

                        if owning.target != entity.name {
                            return Err(Error::invalid_schema(format!(
                                "`{}.{}` pairs with `{}.{}`, which targets `{}`",
                                entity.name, field.name, rel.target, rel.pair, owning.target
                            )));
                        }
                    }
                }
            }
        }

        Ok(Registry {
            entities: self.entities,
        })
    }
}
