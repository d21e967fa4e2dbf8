use crate::ExecLog;

use maquette_core::{
    async_trait,
    driver::{Connection, Driver, Operation, Response},
    schema::Registry,
    Result,
};

use std::{borrow::Cow, sync::Arc};

/// Wraps a driver, recording every operation its connections execute.
#[derive(Debug)]
pub struct LoggingDriver<D> {
    inner: D,
    log: ExecLog,
}

impl<D: Driver> LoggingDriver<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            log: ExecLog::new(),
        }
    }

    pub fn log(&self) -> ExecLog {
        self.log.clone()
    }
}

#[async_trait]
impl<D: Driver> Driver for LoggingDriver<D> {
    fn url(&self) -> Cow<'_, str> {
        self.inner.url()
    }

    async fn connect(&self) -> Result<Box<dyn Connection>> {
        Ok(Box::new(LoggingConnection {
            inner: self.inner.connect().await?,
            log: self.log.clone(),
        }))
    }
}

#[derive(Debug)]
struct LoggingConnection {
    inner: Box<dyn Connection>,
    log: ExecLog,
}

#[async_trait]
impl Connection for LoggingConnection {
    async fn exec(&mut self, registry: &Arc<Registry>, op: Operation) -> Result<Response> {
        self.log.push(op.clone());
        self.inner.exec(registry, op).await
    }
}
