use crate::{stmt::RowStream, Error, Result};

#[derive(Debug)]
pub struct Response {
    pub rows: Rows,
}

#[derive(Debug)]
pub enum Rows {
    /// Number of rows impacted by the operation.
    Count(u64),

    /// Operation result, as a stream of rows.
    Values(RowStream),
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            rows: Rows::Count(count),
        }
    }

    pub fn rows(rows: impl Into<RowStream>) -> Self {
        Self {
            rows: Rows::Values(rows.into()),
        }
    }

    pub fn empty() -> Self {
        Self {
            rows: Rows::Values(RowStream::default()),
        }
    }
}

impl Rows {
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    pub fn is_values(&self) -> bool {
        matches!(self, Self::Values(_))
    }

    pub fn into_count(self) -> Result<u64> {
        match self {
            Self::Count(count) => Ok(count),
            Self::Values(_) => Err(Error::invalid_result(
                "expected a row count, found a row stream",
            )),
        }
    }

    pub fn into_values(self) -> Result<RowStream> {
        match self {
            Self::Values(values) => Ok(values),
            Self::Count(count) => Err(Error::invalid_result(format!(
                "expected a row stream, found count={count}"
            ))),
        }
    }
}
