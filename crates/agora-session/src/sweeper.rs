//! Periodic cleanup of expired sessions.
//!
//! The store is passive. A node that wants bounded memory between reads
//! spawns this task alongside its listener.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::SessionError;
use crate::store::SessionStore;

/// Default sweep period.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Spawn a task that calls [`SessionStore::cleanup`] every `interval`.
///
/// The first sweep happens one full interval after spawning. Abort the
/// returned handle to stop it.
pub fn spawn_cleanup_task(
    store: Arc<SessionStore>,
    interval: Duration,
) -> Result<JoinHandle<()>, SessionError> {
    if interval.is_zero() {
        return Err(SessionError::InvalidInterval);
    }
    Ok(tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = store.cleanup();
            if evicted > 0 {
                tracing::info!(evicted, remaining = store.len(), "expired sessions swept");
            }
        }
    }))
}
