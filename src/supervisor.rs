//! Component supervision.
//!
//! Every long-lived component loop runs as its own tokio task. The
//! supervisor wraps each one so a panic restarts that component alone,
//! after a short delay, without disturbing its siblings.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

const RESTART_DELAY: Duration = Duration::from_millis(500);

/// Spawns a component loop that is respawned whenever it ends. Component
/// loops never return normally, so an exit means a panic or a bug; both
/// get the same treatment.
pub fn spawn_supervised<F, Fut>(name: &'static str, factory: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let child = tokio::spawn(factory());

            match child.await {
                Ok(()) => {
                    tracing::warn!("Component {} exited; restarting", name);
                }
                Err(e) => {
                    tracing::error!("Component {} crashed: {}; restarting", name, e);
                }
            }

            tokio::time::sleep(RESTART_DELAY).await;
        }
    })
}
