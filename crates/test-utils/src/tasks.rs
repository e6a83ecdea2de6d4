use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};

use dagrun::{Task, TaskContext};

/// Shared record of which vertices were started, in order.
pub type ExecutionLog = Arc<Mutex<Vec<String>>>;

/// A task that records its vertex and immediately reports.
pub struct StubTask {
    executed: ExecutionLog,
    fail: bool,
    payload: Value,
}

impl StubTask {
    pub fn succeeding(executed: &ExecutionLog) -> Self {
        Self {
            executed: Arc::clone(executed),
            fail: false,
            payload: json!({"ok": true}),
        }
    }

    pub fn failing(executed: &ExecutionLog) -> Self {
        Self {
            executed: Arc::clone(executed),
            fail: true,
            payload: Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

impl Task for StubTask {
    fn start(&mut self, ctx: TaskContext) {
        self.executed
            .lock()
            .unwrap()
            .push(ctx.vertex().to_string());
        if self.fail {
            ctx.fail("stub failure");
        } else {
            ctx.succeed(self.payload.clone());
        }
    }
}

/// A task that reports from a spawned future after a delay.
pub struct DelayedTask {
    executed: ExecutionLog,
    delay: Duration,
    fail: bool,
}

impl DelayedTask {
    pub fn succeeding(executed: &ExecutionLog, delay: Duration) -> Self {
        Self {
            executed: Arc::clone(executed),
            delay,
            fail: false,
        }
    }

    pub fn failing(executed: &ExecutionLog, delay: Duration) -> Self {
        Self {
            executed: Arc::clone(executed),
            delay,
            fail: true,
        }
    }
}

impl Task for DelayedTask {
    fn start(&mut self, ctx: TaskContext) {
        let executed = Arc::clone(&self.executed);
        let delay = self.delay;
        let fail = self.fail;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            executed.lock().unwrap().push(ctx.vertex().to_string());
            if fail {
                ctx.fail("delayed failure");
            } else {
                ctx.succeed(json!({"ok": true}));
            }
        });
    }
}

/// A task that never reports; its vertex stays in flight forever.
pub struct NeverTask;

impl Task for NeverTask {
    fn start(&mut self, ctx: TaskContext) {
        // Dropping the context without reporting leaves the vertex in
        // progress until the campaign is torn down.
        drop(ctx);
    }
}
