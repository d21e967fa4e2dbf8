use crate::instance::Instance;

use maquette_core::{stmt::Value, Result};

use std::{collections::HashMap, future::Future, sync::Arc};
use tokio::sync::{Mutex, OnceCell};

/// Per-transaction map guaranteeing at most one materialization per
/// (entity, identifier).
///
/// Concurrent callers of [`get_or_create`](Self::get_or_create) for the same
/// key await the first caller's in-flight load instead of duplicating it.
/// The map's lifetime is one transaction scope; it is dropped on
/// commit/rollback.
#[derive(Debug, Default)]
pub struct IdentityMap {
    entries: Mutex<HashMap<(String, Value), Entry>>,
}

type Entry = Arc<OnceCell<Option<Arc<Instance>>>>;

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the instance cached for the key, loading it via `load` if the
    /// key has not been seen in this scope.
    ///
    /// `load` resolves to `None` when no row exists; the absence is cached
    /// like a hit. A failed load leaves the slot empty, so a later call may
    /// retry.
    pub async fn get_or_create<F, Fut>(
        &self,
        entity: &str,
        id: &Value,
        load: F,
    ) -> Result<Option<Arc<Instance>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Instance>>>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries
                .entry((entity.to_string(), id.clone()))
                .or_default()
                .clone()
        };

        let slot = cell
            .get_or_try_init(|| async { Result::Ok(load().await?.map(Arc::new)) })
            .await?;

        Ok(slot.clone())
    }

    /// Return the cached instance without loading.
    pub async fn get(&self, entity: &str, id: &Value) -> Option<Arc<Instance>> {
        let entries = self.entries.lock().await;
        entries
            .get(&(entity.to_string(), id.clone()))?
            .get()?
            .clone()
    }

    /// Evict the entry for the key, if present.
    pub async fn remove(&self, entity: &str, id: &Value) {
        let mut entries = self.entries.lock().await;
        entries.remove(&(entity.to_string(), id.clone()));
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
