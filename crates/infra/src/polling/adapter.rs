//! Tokio-backed implementation of [`PollScheduler`]
//!
//! Each id owns one spawned loop with its own [`CancellationToken`]. The
//! first tick fires immediately, later ticks follow the interval. A tick is
//! never interrupted: cancellation is observed between ticks, and the
//! orchestrator re-checks stored state before applying a result anyway.
//!
//! Loops carry a generation number so a loop that stops itself never
//! removes the entry of a newer loop started under the same id.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use calrelay_core::{PollScheduler, TickFn, TickOutcome};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::error::{SchedulerError, SchedulerResult};

struct LoopEntry {
    generation: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

type LoopMap = Arc<Mutex<HashMap<String, LoopEntry>>>;

#[derive(Default)]
pub struct TokioPollingAdapter {
    loops: LoopMap,
    generation: AtomicU64,
}

impl TokioPollingAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live loops
    pub fn active_count(&self) -> usize {
        self.loops.lock().len()
    }

    /// Cancel every loop and wait for the tasks to finish.
    ///
    /// A tick in flight is allowed to complete, bounded by `timeout`.
    #[instrument(skip(self))]
    pub async fn shutdown(&self, timeout: Duration) -> SchedulerResult<()> {
        let entries: Vec<(String, LoopEntry)> = self.loops.lock().drain().collect();
        if entries.is_empty() {
            return Ok(());
        }

        info!(count = entries.len(), "Shutting down polling loops");
        for (_, entry) in &entries {
            entry.cancel.cancel();
        }

        let joins = futures::future::join_all(entries.into_iter().map(|(_, entry)| entry.handle));
        let results = tokio::time::timeout(timeout, joins)
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: timeout.as_secs() })?;

        for result in results {
            if let Err(err) = result {
                if !err.is_cancelled() {
                    return Err(SchedulerError::TaskJoinFailed(err.to_string()));
                }
            }
        }
        Ok(())
    }

    fn spawn_loop(
        &self,
        runtime: &Handle,
        id: &str,
        interval: Duration,
        tick: TickFn,
    ) -> LoopEntry {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let cancel = CancellationToken::new();
        let loop_cancel = cancel.clone();
        let loops = Arc::clone(&self.loops);
        let id = id.to_string();

        let handle = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = loop_cancel.cancelled() => {
                        debug!(id = %id, generation, "Polling loop cancelled");
                        return;
                    }
                    _ = ticker.tick() => {}
                }

                if tick().await == TickOutcome::Stop {
                    break;
                }
            }

            let mut loops = loops.lock();
            if loops.get(&id).is_some_and(|entry| entry.generation == generation) {
                loops.remove(&id);
                debug!(id = %id, generation, "Polling loop finished");
            }
        });

        LoopEntry { generation, cancel, handle }
    }
}

impl PollScheduler for TokioPollingAdapter {
    fn start_polling(&self, id: &str, interval: Duration, tick: TickFn) {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                error!(id = %id, error = %SchedulerError::NoRuntime, "Cannot start polling loop");
                return;
            }
        };

        // Spawning under the map lock keeps a loop that stops on its first
        // tick from racing its own registration.
        let mut loops = self.loops.lock();
        if let Some(previous) = loops.remove(id) {
            warn!(id = %id, generation = previous.generation, "Replacing running polling loop");
            previous.cancel.cancel();
        }
        let entry = self.spawn_loop(&runtime, id, interval, tick);
        info!(id = %id, generation = entry.generation, interval_ms = interval.as_millis() as u64, "Polling started");
        loops.insert(id.to_string(), entry);
    }

    fn stop_polling(&self, id: &str) -> bool {
        match self.loops.lock().remove(id) {
            Some(entry) => {
                entry.cancel.cancel();
                info!(id = %id, "Polling stopped");
                true
            }
            None => false,
        }
    }

    fn stop_all_polling(&self) {
        let drained: Vec<(String, LoopEntry)> = self.loops.lock().drain().collect();
        for (id, entry) in drained {
            entry.cancel.cancel();
            debug!(id = %id, "Polling stopped");
        }
    }

    fn is_polling(&self, id: &str) -> bool {
        self.loops.lock().get(id).is_some_and(|entry| !entry.cancel.is_cancelled())
    }
}

impl Drop for TokioPollingAdapter {
    fn drop(&mut self) {
        for (_, entry) in self.loops.lock().drain() {
            entry.cancel.cancel();
        }
    }
}
