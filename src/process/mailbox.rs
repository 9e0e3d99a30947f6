//! The per-process FIFO mailbox with selective-receive (save-queue)
//! semantics.
//!
//! On runtimes with native selective receive the mailbox *is* the
//! selective-receive primitive; here, per Design Notes §9, it is
//! reconstructed as a `VecDeque` scanned in order on every `select` call.
//! Messages that match no clause stay in the queue, in their original
//! relative order, for a future `select` to consider.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::time::Duration;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tokio::time::Instant;

// Layer 3: Internal module imports
use super::envelope::RawEnvelope;
use super::selector::Selector;

pub(crate) struct Mailbox {
    queue: Mutex<VecDeque<RawEnvelope>>,
    notify: tokio::sync::Notify,
}

impl Mailbox {
    pub(crate) fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            notify: tokio::sync::Notify::new(),
        }
    }

    pub(crate) fn push(&self, env: RawEnvelope) {
        self.queue.lock().push_back(env);
        self.notify.notify_waiters();
    }

    /// Removes every queued envelope for which `keep` returns `false`.
    pub(crate) fn retain(&self, keep: impl Fn(&RawEnvelope) -> bool) {
        self.queue.lock().retain(keep);
    }

    fn try_take<M: Send + 'static>(&self, selector: &Selector<M>) -> Option<M> {
        let mut queue = self.queue.lock();
        let pos = queue.iter().position(|env| selector.matches(env))?;
        let env = queue.remove(pos)?;
        drop(queue);
        Some(selector.extract(env))
    }

    /// Blocks until a message matching `selector` is available, or
    /// `timeout` elapses. On timeout, nothing is dequeued.
    pub(crate) async fn select<M: Send + 'static>(
        &self,
        selector: &Selector<M>,
        timeout: Duration,
    ) -> Option<M> {
        let deadline = Instant::now() + timeout;
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Registers this poll as a waiter before the check below, so a
            // `push` landing between the check and the `await` still wakes
            // it — `notify_waiters` only reaches already-registered waiters.
            notified.as_mut().enable();

            if let Some(value) = self.try_take(selector) {
                return Some(value);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            if tokio::time::timeout(remaining, notified).await.is_err() {
                return None;
            }
        }
    }

    /// Blocks indefinitely until a message matching `selector` arrives.
    pub(crate) async fn select_forever<M: Send + 'static>(&self, selector: &Selector<M>) -> M {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(value) = self.try_take(selector) {
                return value;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::exit::ExitReason;

    #[tokio::test]
    async fn select_times_out_without_dequeuing() {
        let mailbox = Mailbox::new();
        mailbox.push(RawEnvelope::Record3 {
            tag: "unrelated",
            payload: Box::new(1u32),
        });
        let sel = Selector::<()>::selecting_record3::<u32>("other", |_| ());
        let got = mailbox.select(&sel, Duration::from_millis(20)).await;
        assert!(got.is_none());
        assert_eq!(mailbox.queue.lock().len(), 1, "unmatched message stays queued");
    }

    #[tokio::test]
    async fn select_dequeues_first_matching_message_in_order() {
        let mailbox = Mailbox::new();
        mailbox.push(RawEnvelope::Record3 {
            tag: "a",
            payload: Box::new(1u32),
        });
        mailbox.push(RawEnvelope::Record3 {
            tag: "b",
            payload: Box::new(2u32),
        });
        let sel = Selector::<u32>::selecting_record3::<u32>("b", |v| v);
        let got = mailbox.select(&sel, Duration::from_millis(50)).await;
        assert_eq!(got, Some(2));
        assert_eq!(mailbox.queue.lock().len(), 1, "the 'a' message must remain queued");
    }

    #[tokio::test]
    async fn process_down_reason_survives_extraction() {
        let mailbox = Mailbox::new();
        let id = crate::process::pid::Ref::new();
        mailbox.push(RawEnvelope::ProcessDown {
            monitor_id: id,
            pid: crate::process::pid::Pid::new(),
            reason: ExitReason::abnormal("boom"),
        });
        let sel = Selector::<ExitReason>::selecting_process_down(
            crate::process::monitor::MonitorRef::new(id, crate::process::pid::Pid::new()),
            |_pid, reason| reason,
        );
        let got = mailbox.select(&sel, Duration::from_millis(50)).await;
        assert_eq!(got.unwrap().abnormal_message(), Some("boom"));
    }
}
