use crate::session::Session;

use maquette_core::{
    driver::{operation::Transaction, Connection, Driver},
    schema::Registry,
    Error, Result,
};

use std::{future::Future, sync::Arc};
use tokio::sync::{Mutex, OnceCell};

tokio::task_local! {
    /// Factory whose transaction scope encloses the current task, if any.
    static ACTIVE_SCOPE: usize;
}

/// Entry point for transaction scopes against one row source.
///
/// The connection is opened lazily on the first transaction and reused for
/// every scope after it. Scopes are serialized: a transaction holds the
/// connection exclusively until it commits or rolls back.
#[derive(Debug)]
pub struct SessionFactory {
    registry: Arc<Registry>,
    driver: Box<dyn Driver>,
    conn: OnceCell<Arc<Mutex<Box<dyn Connection>>>>,
    gate: Mutex<()>,
}

impl SessionFactory {
    pub fn new(registry: Registry, driver: impl Driver) -> Self {
        Self {
            registry: Arc::new(registry),
            driver: Box::new(driver),
            conn: OnceCell::new(),
            gate: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    async fn connection(&self) -> Result<Arc<Mutex<Box<dyn Connection>>>> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                tracing::debug!(url = %self.driver.url(), "connect");
                Ok::<_, maquette_core::Error>(Arc::new(Mutex::new(self.driver.connect().await?)))
            })
            .await?;

        Ok(conn.clone())
    }

    /// Run `work` inside a transaction scope.
    ///
    /// The session handed to `work` is valid only for this scope; its
    /// identity map is dropped with it. The transaction commits when `work`
    /// resolves to `Ok` and rolls back when it resolves to `Err`, in which
    /// case the work's error is re-signaled.
    ///
    /// Scopes do not nest: calling `with_transaction` on this factory from
    /// inside `work` fails with a constraint violation rather than waiting
    /// on the scope that encloses it.
    pub async fn with_transaction<T, F, Fut>(&self, work: F) -> Result<T>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let factory_id = self as *const Self as usize;
        if ACTIVE_SCOPE.try_with(|id| *id == factory_id).unwrap_or(false) {
            return Err(Error::constraint_violation(
                "transaction scope opened inside an active scope on the same factory",
            ));
        }

        let _scope = self.gate.lock().await;
        let conn = self.connection().await?;
        let session = Session::new(self.registry.clone(), conn);

        session.exec(Transaction::Start.into()).await?;

        ACTIVE_SCOPE
            .scope(factory_id, async {
                match work(session.clone()).await {
                    Ok(value) => {
                        session.exec(Transaction::Commit.into()).await?;
                        Ok(value)
                    }
                    Err(err) => {
                        if let Err(rollback_err) =
                            session.exec(Transaction::Rollback.into()).await
                        {
                            tracing::warn!(?rollback_err, "rollback failed");
                        }
                        Err(err)
                    }
                }
            })
            .await
    }
}
