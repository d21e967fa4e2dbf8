pub mod operation;
pub use operation::Operation;

mod response;
pub use response::{Response, Rows};

use crate::{async_trait, schema::Registry, Result};

use std::{borrow::Cow, fmt::Debug, sync::Arc};

/// An asynchronous row source.
///
/// SQL text generation is out of scope; operations are handed to the driver
/// in a parameterized structured form.
#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Connection URL the driver was configured with.
    fn url(&self) -> Cow<'_, str>;

    /// Open a connection to the underlying store.
    async fn connect(&self) -> Result<Box<dyn Connection>>;
}

/// A single connection to the row source. Operations execute sequentially;
/// transaction state is per connection.
#[async_trait]
pub trait Connection: Debug + Send + 'static {
    /// Execute a database operation.
    async fn exec(&mut self, registry: &Arc<Registry>, op: Operation) -> Result<Response>;
}
