use super::{BelongsTo, HasMany};

/// Descriptor for a mapped entity: identifier, scalar fields, and
/// associations. Immutable once registered.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Name of the entity, unique within the registry.
    pub name: String,

    /// Name of the backing table.
    pub table: String,

    /// Name of the identifier field. Doubles as the primary key column name.
    pub id_field: String,

    /// Fields contained by the entity, in declaration order.
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone)]
pub struct Field {
    /// The field name.
    pub name: String,

    /// Scalar, owning-side association, or inverse-side collection.
    pub ty: FieldTy,
}

#[derive(Debug, Clone)]
pub enum FieldTy {
    Scalar(Scalar),
    BelongsTo(BelongsTo),
    HasMany(HasMany),
}

#[derive(Debug, Clone)]
pub struct Scalar {
    /// Column the field maps to.
    pub column: String,
}

impl Entity {
    /// Create a descriptor. The table name defaults to the lowercased entity
    /// name and the identifier field to `id`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let table = name.to_lowercase();

        Self {
            name,
            table,
            id_field: "id".to_string(),
            fields: vec![],
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn id_field(mut self, name: impl Into<String>) -> Self {
        self.id_field = name.into();
        self
    }

    /// Add a scalar field mapped to a column of the same name.
    pub fn scalar(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let column = name.clone();
        self.fields.push(Field {
            name,
            ty: FieldTy::Scalar(Scalar { column }),
        });
        self
    }

    /// Add an owning-side many-to-one association.
    pub fn belongs_to(mut self, name: impl Into<String>, rel: BelongsTo) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty: FieldTy::BelongsTo(rel),
        });
        self
    }

    /// Add an inverse-side one-to-many association.
    pub fn has_many(mut self, name: impl Into<String>, rel: HasMany) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty: FieldTy::HasMany(rel),
        });
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Columns of the entity's rows: identifier first, then scalar and
    /// owning-side join columns in declared order. Collection fields occupy
    /// no column.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns = vec![self.id_field.as_str()];
        columns.extend(self.fields.iter().filter_map(Field::column));
        columns
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns().iter().position(|c| *c == column)
    }

    /// Number of columns in the entity's rows.
    pub fn row_width(&self) -> usize {
        1 + self
            .fields
            .iter()
            .filter(|field| field.column().is_some())
            .count()
    }
}

impl Field {
    /// The column this field maps to, if any.
    pub fn column(&self) -> Option<&str> {
        match &self.ty {
            FieldTy::Scalar(scalar) => Some(&scalar.column),
            FieldTy::BelongsTo(rel) => Some(&rel.join_column),
            FieldTy::HasMany(_) => None,
        }
    }
}

impl FieldTy {
    pub fn as_belongs_to(&self) -> Option<&BelongsTo> {
        match self {
            FieldTy::BelongsTo(rel) => Some(rel),
            _ => None,
        }
    }

    pub fn as_has_many(&self) -> Option<&HasMany> {
        match self {
            FieldTy::HasMany(rel) => Some(rel),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, FieldTy::Scalar(_))
    }
}
