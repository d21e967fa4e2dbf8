/// Behavior when a non-null foreign key references no existing row.
///
/// Orthogonal to join-column nullability: a null key means "no relationship"
/// and resolves to nothing without consulting this policy, while a non-null
/// key pointing nowhere is a broken relationship and is what the policy
/// governs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotFound {
    /// Treat the dangling reference as an absent association.
    #[default]
    Ignore,

    /// Fail the fetch with a dangling-reference error.
    Exception,
}

/// Owning side of a many-to-one association. This entity holds the join
/// column storing the target's identifier.
#[derive(Debug, Clone)]
pub struct BelongsTo {
    /// Name of the target entity.
    pub target: String,

    /// Column holding the target's identifier.
    pub join_column: String,

    /// Whether the join column may be null at persist time.
    pub nullable: bool,

    /// Policy applied when a non-null key resolves to no row.
    pub not_found: NotFound,
}

impl BelongsTo {
    pub fn new(target: impl Into<String>, join_column: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            join_column: join_column.into(),
            nullable: true,
            not_found: NotFound::Ignore,
        }
    }

    /// Require a non-null join column at persist time.
    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn not_found(mut self, policy: NotFound) -> Self {
        self.not_found = policy;
        self
    }
}

/// Inverse side of a one-to-many association. Matching rows are found by
/// querying the owning side's join column.
#[derive(Debug, Clone)]
pub struct HasMany {
    /// Name of the target entity.
    pub target: String,

    /// The `BelongsTo` field on the target whose join column must equal the
    /// owner's identifier.
    pub pair: String,
}

impl HasMany {
    pub fn new(target: impl Into<String>, pair: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            pair: pair.into(),
        }
    }
}
