use crate::stmt::Value;

use std::fmt;

/// An error that can occur in maquette.
pub struct Error {
    kind: ErrorKind,
}

#[derive(Debug)]
enum ErrorKind {
    /// An operation referenced an entity name that is not registered.
    UnknownEntity(String),

    /// A second entity was registered under an already-taken name.
    DuplicateEntity(String),

    /// An operation referenced a field the entity does not declare.
    UnknownField { entity: String, field: String },

    /// The registry failed cross-validation at build time.
    InvalidSchema(String),

    /// A query string falls outside the restricted grammar.
    QuerySyntax(String),

    /// A usage constraint was violated before reaching the storage layer:
    /// a bad persist batch, or a nested transaction scope.
    ConstraintViolation(String),

    /// A non-null foreign key resolved to a missing row under the
    /// exception policy.
    DanglingReference { entity: String, key: Value },

    /// A single-result operation matched no records.
    RecordNotFound(String),

    /// A single-result operation matched more than one record.
    TooManyRecords(String),

    /// A response or value had a shape the caller did not expect.
    InvalidResult(String),

    /// The underlying row source failed.
    Driver(anyhow::Error),

    /// Anything bridged in from `anyhow`.
    Other(anyhow::Error),
}

impl Error {
    pub fn unknown_entity(name: impl Into<String>) -> Self {
        ErrorKind::UnknownEntity(name.into()).into()
    }

    pub fn duplicate_entity(name: impl Into<String>) -> Self {
        ErrorKind::DuplicateEntity(name.into()).into()
    }

    pub fn unknown_field(entity: impl Into<String>, field: impl Into<String>) -> Self {
        ErrorKind::UnknownField {
            entity: entity.into(),
            field: field.into(),
        }
        .into()
    }

    pub fn invalid_schema(message: impl Into<String>) -> Self {
        ErrorKind::InvalidSchema(message.into()).into()
    }

    pub fn query_syntax(message: impl Into<String>) -> Self {
        ErrorKind::QuerySyntax(message.into()).into()
    }

    pub fn constraint_violation(message: impl Into<String>) -> Self {
        ErrorKind::ConstraintViolation(message.into()).into()
    }

    pub fn dangling_reference(entity: impl Into<String>, key: Value) -> Self {
        ErrorKind::DanglingReference {
            entity: entity.into(),
            key,
        }
        .into()
    }

    pub fn record_not_found(message: impl Into<String>) -> Self {
        ErrorKind::RecordNotFound(message.into()).into()
    }

    pub fn too_many_records(message: impl Into<String>) -> Self {
        ErrorKind::TooManyRecords(message.into()).into()
    }

    pub fn invalid_result(message: impl Into<String>) -> Self {
        ErrorKind::InvalidResult(message.into()).into()
    }

    pub fn driver(err: impl Into<anyhow::Error>) -> Self {
        ErrorKind::Driver(err.into()).into()
    }

    pub fn is_unknown_entity(&self) -> bool {
        matches!(self.kind, ErrorKind::UnknownEntity(_))
    }

    pub fn is_duplicate_entity(&self) -> bool {
        matches!(self.kind, ErrorKind::DuplicateEntity(_))
    }

    pub fn is_unknown_field(&self) -> bool {
        matches!(self.kind, ErrorKind::UnknownField { .. })
    }

    pub fn is_invalid_schema(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidSchema(_))
    }

    pub fn is_query_syntax(&self) -> bool {
        matches!(self.kind, ErrorKind::QuerySyntax(_))
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self.kind, ErrorKind::ConstraintViolation(_))
    }

    pub fn is_dangling_reference(&self) -> bool {
        matches!(self.kind, ErrorKind::DanglingReference { .. })
    }

    pub fn is_record_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::RecordNotFound(_))
    }

    pub fn is_too_many_records(&self) -> bool {
        matches!(self.kind, ErrorKind::TooManyRecords(_))
    }

    pub fn is_driver(&self) -> bool {
        matches!(self.kind, ErrorKind::Driver(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use self::ErrorKind::*;

        match &self.kind {
            UnknownEntity(name) => write!(f, "unknown entity `{name}`"),
            DuplicateEntity(name) => write!(f, "duplicate entity `{name}`"),
            UnknownField { entity, field } => {
                write!(f, "unknown field `{field}` on entity `{entity}`")
            }
            InvalidSchema(message) => write!(f, "invalid schema: {message}"),
            QuerySyntax(message) => write!(f, "query syntax error: {message}"),
            ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
            DanglingReference { entity, key } => {
                write!(f, "dangling reference: entity `{entity}` key={key}")
            }
            RecordNotFound(message) => write!(f, "record not found: {message}"),
            TooManyRecords(message) => write!(f, "too many records: {message}"),
            InvalidResult(message) => write!(f, "invalid result: {message}"),
            Driver(err) => write!(f, "driver operation failed: {err}"),
            Other(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_struct("Error").field("kind", &self.kind).finish()
        } else {
            fmt::Display::fmt(self, f)
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Driver(err) | ErrorKind::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        ErrorKind::Other(err).into()
    }
}
