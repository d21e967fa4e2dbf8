use maquette_core::driver::Operation;

use std::sync::{Arc, Mutex};

/// Shared log of the operations a connection has executed.
#[derive(Debug, Clone, Default)]
pub struct ExecLog {
    ops: Arc<Mutex<Vec<Operation>>>,
}

impl ExecLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, op: Operation) {
        self.ops.lock().unwrap().push(op);
    }

    pub fn len(&self) -> usize {
        self.ops.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.lock().unwrap().is_empty()
    }

    pub fn clear(&self) {
        self.ops.lock().unwrap().clear();
    }

    /// Count the logged operations matching a predicate.
    pub fn count(&self, pred: impl Fn(&Operation) -> bool) -> usize {
        self.ops.lock().unwrap().iter().filter(|op| pred(op)).count()
    }

    pub fn any(&self, pred: impl Fn(&Operation) -> bool) -> bool {
        self.count(pred) > 0
    }

    /// Run `f` over a snapshot of the logged operations.
    pub fn with_ops<T>(&self, f: impl FnOnce(&[Operation]) -> T) -> T {
        f(&self.ops.lock().unwrap())
    }
}
