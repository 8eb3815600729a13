use std::time::Duration;

use tokio::task::JoinHandle;

/// How long `shutdown` waits for the task to unsubscribe before aborting it
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Handle to a running log subscription task
pub struct SubscriptionHandle {
    task: JoinHandle<()>,
    unsub_fn: Box<dyn Fn() + Send + Sync>,
}

impl SubscriptionHandle {
    pub fn new(task: JoinHandle<()>, unsub_fn: Box<dyn Fn() + Send + Sync>) -> Self {
        Self { task, unsub_fn }
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Asks the task to unsubscribe, aborting it if it does not exit in time.
    pub async fn shutdown(self) {
        (self.unsub_fn)();
        let mut task = self.task;
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await.is_err() {
            task.abort();
        }
    }
}
