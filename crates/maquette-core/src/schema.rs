mod builder;
pub use builder::Builder;

mod entity;
pub use entity::{Entity, Field, FieldTy, Scalar};

mod relation;
pub use relation::{BelongsTo, HasMany, NotFound};

use crate::Result;

use indexmap::IndexMap;

/// Registry of entity descriptors.
///
/// Built once at startup via [`Builder`], then shared read-only; no locking
/// is required after construction.
#[derive(Debug)]
pub struct Registry {
    entities: IndexMap<String, Entity>,
}

impl Registry {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Look up a descriptor by entity name.
    pub fn entity(&self, name: &str) -> Result<&Entity> {
        self.entities
            .get(name)
            .ok_or_else(|| crate::Error::unknown_entity(name))
    }

    /// Look up a descriptor by table name.
    pub fn entity_for_table(&self, table: &str) -> Result<&Entity> {
        self.entities
            .values()
            .find(|entity| entity.table == table)
            .ok_or_else(|| crate::Error::unknown_entity(table))
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }
}
