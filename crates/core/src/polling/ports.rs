//! Port interface for the polling timer
//!
//! The background process may be suspended between ticks, so loop handles
//! are a disposable cache. Whoever starts a loop must be able to rebuild it
//! from stored state.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

/// What the loop should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Stop,
}

/// Tick callback; each invocation returns a fresh future
pub type TickFn = Arc<dyn Fn() -> BoxFuture<'static, TickOutcome> + Send + Sync>;

/// Keyed interval timers, at most one per id
pub trait PollScheduler: Send + Sync {
    /// Start ticking `id` every `interval`; the first tick fires immediately.
    /// A loop already running under `id` is stopped first.
    fn start_polling(&self, id: &str, interval: Duration, tick: TickFn);

    /// Returns false when no loop was running under `id`
    fn stop_polling(&self, id: &str) -> bool;

    fn stop_all_polling(&self);

    fn is_polling(&self, id: &str) -> bool;
}
