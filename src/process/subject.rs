//! Typed inbox endpoints layered over the untyped mailbox.

// Layer 1: Standard library imports
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

// Layer 3: Internal module imports
use super::envelope::RawEnvelope;
use super::handle::ProcessHandle;
use super::pid::Pid;

static NEXT_SUBJECT_ID: AtomicU64 = AtomicU64::new(0);

fn next_subject_id() -> u64 {
    NEXT_SUBJECT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A typed inbox endpoint for messages of type `M`.
///
/// A subject is owned by exactly one process (its receiver, identified by
/// [`Subject::owner_pid`]); any number of senders may hold clones.
/// Sending is non-blocking, unbounded, and FIFO per sender–receiver pair.
/// Sending to a subject whose owner has died is silently dropped.
pub struct Subject<M> {
    owner: Pid,
    subject_id: u64,
    handle: Weak<ProcessHandle>,
    _marker: PhantomData<fn(M)>,
}

impl<M> Subject<M> {
    pub(crate) fn new(owner: &Arc<ProcessHandle>) -> Self {
        Self {
            owner: owner.pid(),
            subject_id: next_subject_id(),
            handle: Arc::downgrade(owner),
            _marker: PhantomData,
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.subject_id
    }

    /// The `Pid` of this subject's owning (receiving) process.
    pub fn owner_pid(&self) -> Pid {
        self.owner
    }
}

impl<M: Send + 'static> Subject<M> {
    /// Enqueues `msg` into the owner's mailbox. Infallible in contract: a
    /// dead owner simply drops the message.
    pub fn send(&self, msg: M) {
        if let Some(handle) = self.handle.upgrade() {
            handle.mailbox().push(RawEnvelope::Subject {
                subject_id: self.subject_id,
                payload: Box::new(msg),
            });
        }
    }
}

impl<M> Clone for Subject<M> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner,
            subject_id: self.subject_id,
            handle: self.handle.clone(),
            _marker: PhantomData,
        }
    }
}

impl<M> std::fmt::Debug for Subject<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("owner", &self.owner)
            .field("subject_id", &self.subject_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_to_dead_owner_does_not_panic() {
        let handle = Arc::new(ProcessHandle::new());
        let subject = Subject::<u32>::new(&handle);
        drop(handle);
        subject.send(42); // must be a silent no-op
    }
}
