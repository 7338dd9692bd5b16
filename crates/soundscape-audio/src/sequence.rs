//! Sequence playback: step through all scene slots on a fixed period.
//!
//! The driver only owns timing and index arithmetic. Whoever plays the
//! scenes subscribes to the state channel and reconciles on every change.

use soundscape_core::LAST_SCENE_INDEX;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info};

/// Observable driver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SequenceState {
    pub active: bool,
    pub index: usize,
    /// Set when a run went through the last slot and halted on its own.
    pub completed: bool,
}

/// Advances the current scene index once per period while active. After
/// the last slot it halts and resets the index to 0; the sequence plays
/// once and does not loop.
pub struct SequenceDriver {
    period: Duration,
    state: Arc<watch::Sender<SequenceState>>,
    task: Option<JoinHandle<()>>,
}

impl SequenceDriver {
    pub fn new(period: Duration) -> Self {
        let (tx, _rx) = watch::channel(SequenceState::default());
        Self {
            period,
            state: Arc::new(tx),
            task: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn subscribe(&self) -> watch::Receiver<SequenceState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SequenceState {
        *self.state.borrow()
    }

    pub fn is_active(&self) -> bool {
        self.state().active
    }

    /// Start from slot 0. Must be called inside a tokio runtime.
    pub fn start(&mut self) {
        self.cancel();
        self.state.send_replace(SequenceState {
            active: true,
            index: 0,
            completed: false,
        });

        let state = Arc::clone(&self.state);
        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            loop {
                ticks.tick().await;
                let mut halted = false;
                state.send_modify(|s| {
                    if s.index >= LAST_SCENE_INDEX {
                        s.active = false;
                        s.index = 0;
                        s.completed = true;
                        halted = true;
                    } else {
                        s.index += 1;
                    }
                });
                if halted {
                    info!("Sequence finished");
                    break;
                }
                debug!(index = state.borrow().index, "Sequence advanced");
            }
        }));
        info!(period_ms = self.period.as_millis() as u64, "Sequence started");
    }

    /// Cancel the timer. The index is kept.
    pub fn stop(&mut self) {
        self.cancel();
        self.state.send_if_modified(|s| {
            let was_active = s.active;
            s.active = false;
            was_active
        });
    }

    /// Jump to a slot, e.g. on manual scene selection. A running sequence
    /// continues from there.
    pub fn set_index(&mut self, index: usize) {
        let index = index.min(LAST_SCENE_INDEX);
        self.state.send_if_modified(|s| {
            let changed = s.index != index;
            s.index = index;
            changed
        });
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for SequenceDriver {
    fn drop(&mut self) {
        self.cancel();
    }
}
