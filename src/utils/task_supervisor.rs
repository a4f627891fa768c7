use std::collections::HashMap;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::{Error, Result};

/// Owns the refresh loops spawned by the scheduler.
///
/// Refresh loops never return on their own, so a finished handle means the
/// loop panicked or was aborted.
pub struct TaskSupervisor {
    tasks: HashMap<String, JoinHandle<()>>,
}

impl TaskSupervisor {
    pub fn new() -> Self {
        TaskSupervisor {
            tasks: HashMap::new(),
        }
    }

    pub fn spawn<F>(&mut self, name: impl Into<String>, future: F) -> &mut Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let handle = tokio::spawn(future);

        info!("Spawned refresh loop: {}", name);
        if let Some(previous) = self.tasks.insert(name, handle) {
            previous.abort();
        }
        self
    }

    /// Reports and forgets loops that are no longer running.
    pub fn check_health(&mut self) -> Result<()> {
        let finished: Vec<String> = self
            .tasks
            .iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(name, _)| name.clone())
            .collect();

        if finished.is_empty() {
            return Ok(());
        }

        for name in &finished {
            self.tasks.remove(name);
        }

        let message = format!("refresh loops terminated unexpectedly: {:?}", finished);
        error!("{}", message);
        Err(Error::TaskFailed(message))
    }

    pub fn active_task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn task_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tasks.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn shutdown_all(&mut self) {
        info!("Shutting down {} refresh loops", self.tasks.len());

        for (name, handle) in self.tasks.drain() {
            handle.abort();
            // A cancelled JoinError is the expected outcome here
            let _ = handle.await;
            info!("Stopped refresh loop: {}", name);
        }
    }
}

impl Default for TaskSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn finished_tasks_are_reported_once() {
        let mut supervisor = TaskSupervisor::new();
        supervisor.spawn("short", async {});
        supervisor.spawn("long", std::future::pending::<()>());

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(matches!(supervisor.check_health(), Err(Error::TaskFailed(_))));
        assert_eq!(supervisor.task_names(), vec!["long".to_string()]);
        assert!(supervisor.check_health().is_ok());

        supervisor.shutdown_all().await;
        assert_eq!(supervisor.active_task_count(), 0);
    }
}
