use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::MailboxGateway;
use crate::engine::MailboxEngine;

/// Keeps the cache fresh in the background: a full reload every `interval`
/// (the first one immediately) and a refetch of invalidated mailboxes as
/// soon as a mutation marks them stale.
///
/// Must be called from within a tokio runtime.
pub fn spawn_refresher<G>(engine: Arc<MailboxEngine<G>>, interval: Duration) -> RefresherHandle
where
    G: MailboxGateway + 'static,
{
    // A zero period would make the ticker panic.
    let interval = interval.max(Duration::from_millis(1));
    let wake = engine.wake_handle();
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = engine.reload_all().await {
                        log::warn!("periodic refresh failed: {err}");
                    }
                }
                _ = wake.notified() => {
                    if let Err(err) = engine.refetch_stale().await {
                        log::warn!("refetching invalidated mailboxes failed: {err}");
                    }
                }
            }
        }
    });

    RefresherHandle { task }
}

/// Stops the refresher when shut down or dropped.
#[derive(Debug)]
pub struct RefresherHandle {
    task: JoinHandle<()>,
}

impl RefresherHandle {
    pub fn shutdown(self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for RefresherHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
