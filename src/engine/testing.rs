use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};

use super::{Engine, EngineStatus};

/// Engine double whose status is set by the test. Clones share the same status.
#[derive(Clone)]
pub struct FakeEngine {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    status: EngineStatus,
    failing: bool,
}

impl FakeEngine {
    pub fn new(status: EngineStatus) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                status,
                failing: false,
            })),
        }
    }

    pub fn modify(&self, f: impl FnOnce(&mut EngineStatus)) {
        f(&mut self.inner.lock().unwrap().status);
    }

    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().unwrap().failing = failing;
    }
}

impl Engine for FakeEngine {
    fn status(&self) -> Result<EngineStatus> {
        let inner = self.inner.lock().unwrap();
        if inner.failing {
            return Err(anyhow!("engine went away"));
        }
        Ok(inner.status.clone())
    }
}
