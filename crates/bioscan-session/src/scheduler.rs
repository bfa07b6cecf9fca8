//! # Scheduled Sequences
//!
//! Runs a [`StatusSequence`] on the tokio clock as one cancellable task.
//!
//! ## Task Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    ScheduledSequence Task                               │
//! │                                                                         │
//! │  for step in steps:                                                    │
//! │      on_step(step) ──► false? ──► Abandoned (owner moved on)          │
//! │      select! {                                                         │
//! │          cancel_rx.recv()     ──► Cancelled                            │
//! │          sleep(step.duration) ──► next step                            │
//! │      }                                                                 │
//! │  on_complete()                ──► Completed                            │
//! │                                                                         │
//! │  Dropping the SequenceHandle closes the cancel channel, which also     │
//! │  cancels the task.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use bioscan_core::{StatusSequence, StatusStep};

/// How a scheduled sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// Every step ran and the completion callback fired.
    Completed,
    /// Cancelled through the handle.
    Cancelled,
    /// A step callback returned false.
    Abandoned,
}

/// Spawner for timed status sequences.
pub struct ScheduledSequence;

impl ScheduledSequence {
    /// Spawns `sequence` on the current tokio runtime.
    ///
    /// `on_step` runs at the start of each step and returns false when the
    /// owner no longer wants the sequence. `on_complete` runs once after the
    /// last step has elapsed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S, C>(sequence: StatusSequence, mut on_step: S, on_complete: C) -> SequenceHandle
    where
        S: FnMut(&StatusStep) -> bool + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        let (cancel_tx, mut cancel_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            for step in sequence {
                if !on_step(&step) {
                    debug!(label = step.label, "Sequence abandoned");
                    return SequenceOutcome::Abandoned;
                }

                tokio::select! {
                    biased;
                    _ = cancel_rx.recv() => {
                        debug!(label = step.label, "Sequence cancelled");
                        return SequenceOutcome::Cancelled;
                    }
                    _ = tokio::time::sleep(step.duration) => {}
                }
            }

            on_complete();
            SequenceOutcome::Completed
        });

        SequenceHandle { cancel_tx, task }
    }
}

/// Handle to a running sequence.
pub struct SequenceHandle {
    cancel_tx: mpsc::Sender<()>,
    task: JoinHandle<SequenceOutcome>,
}

impl SequenceHandle {
    /// Requests cancellation. Takes effect at the next step boundary.
    pub fn cancel(&self) {
        // A full or closed channel means the task is already stopping.
        let _ = self.cancel_tx.try_send(());
    }

    /// Waits for the task to end.
    pub async fn join(self) -> SequenceOutcome {
        let SequenceHandle { cancel_tx, task } = self;
        let outcome = task.await.unwrap_or(SequenceOutcome::Cancelled);
        drop(cancel_tx);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::{sleep, Instant};

    const STEP: Duration = Duration::from_millis(600);

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl FnMut(&StatusStep) -> bool) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |step: &StatusStep| {
            sink.lock().unwrap().push(step.label);
            true
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_every_step_in_order() {
        let (seen, on_step) = recorder();
        let start = Instant::now();

        let handle = ScheduledSequence::spawn(StatusSequence::connect(STEP), on_step, || {});

        assert_eq!(handle.join().await, SequenceOutcome::Completed);
        assert!(start.elapsed() >= Duration::from_millis(3000));
        assert!(start.elapsed() < Duration::from_millis(3100));
        assert_eq!(
            *seen.lock().unwrap(),
            StatusSequence::connect(STEP).labels()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_labels_follow_cadence() {
        let (seen, on_step) = recorder();
        let _handle = ScheduledSequence::spawn(StatusSequence::connect(STEP), on_step, || {});

        sleep(Duration::from_millis(1300)).await;
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_skips_completion() {
        let completed = Arc::new(Mutex::new(false));
        let flag = completed.clone();
        let (seen, on_step) = recorder();

        let handle = ScheduledSequence::spawn(StatusSequence::connect(STEP), on_step, move || {
            *flag.lock().unwrap() = true;
        });

        sleep(Duration::from_millis(700)).await;
        handle.cancel();

        assert_eq!(handle.join().await, SequenceOutcome::Cancelled);
        assert!(!*completed.lock().unwrap());
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_callback_can_abandon() {
        let handle = ScheduledSequence::spawn(
            StatusSequence::connect(STEP),
            |step: &StatusStep| step.label != "Establishing secure link...",
            || panic!("completion must not run"),
        );

        assert_eq!(handle.join().await, SequenceOutcome::Abandoned);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_cancels() {
        let completed = Arc::new(Mutex::new(false));
        let flag = completed.clone();

        let handle = ScheduledSequence::spawn(
            StatusSequence::connect(STEP),
            |_: &StatusStep| true,
            move || *flag.lock().unwrap() = true,
        );
        drop(handle);

        sleep(Duration::from_secs(10)).await;
        assert!(!*completed.lock().unwrap());
    }
}
