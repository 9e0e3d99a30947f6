//! The one-shot reply handle shared by the synchronous call protocol
//! (component C) and system-message normalization (component B).
//!
//! Both components need the same shape: a closure bound to a caller `Pid`
//! and a correlation [`Ref`], whose sole operation delivers a value back to
//! the caller's mailbox exactly once. Rather than duplicate that wiring in
//! `call` and `system_message`, it lives here as a process primitive.

// Layer 1: Standard library imports
use std::marker::PhantomData;

// Layer 3: Internal module imports
use super::envelope::RawEnvelope;
use super::pid::{Pid, Ref};
use super::registry;

/// Captures a reply-subject `Pid` and a correlation [`Ref`]. Its sole
/// operation, [`Reply::reply`], sends `(ref, value)` to the caller;
/// send failures (the caller may have timed out and stopped watching)
/// are swallowed, matching §3's `From<reply>`.
///
/// Consumes `self` on reply so that, at the type level, a `Reply` can be
/// fulfilled at most once — callers that need to reply conditionally must
/// hold onto the `Reply` value itself, not invoke this twice.
pub struct Reply<R> {
    caller: Pid,
    call_ref: Ref,
    _marker: PhantomData<fn(R)>,
}

impl<R> Reply<R> {
    pub(crate) fn new(caller: Pid, call_ref: Ref) -> Self {
        Self {
            caller,
            call_ref,
            _marker: PhantomData,
        }
    }

    /// The correlation ref this reply is bound to, used by the sender side
    /// to build the matching [`super::Selector::selecting_reply`] clause.
    pub(crate) fn call_ref(&self) -> Ref {
        self.call_ref
    }
}

impl<R: Send + 'static> Reply<R> {
    /// Sends `value` back to the caller. A dead caller silently drops it.
    pub fn reply(self, value: R) {
        if let Some(handle) = registry::lookup(self.caller) {
            handle.mailbox().push(RawEnvelope::Reply {
                call_ref: self.call_ref,
                payload: Box::new(value),
            });
        }
    }
}

impl<R> std::fmt::Debug for Reply<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reply")
            .field("caller", &self.caller)
            .field("call_ref", &self.call_ref)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{self, ExitReason, Selector};
    use std::time::Duration;

    #[tokio::test]
    async fn reply_delivers_to_caller_mailbox() {
        let pid = process::start(false, |_pid| async move {
            let caller = process::current_pid().unwrap();
            let call_ref = Ref::new();
            let reply = Reply::<u32>::new(caller, call_ref);
            reply.reply(7);
            let sel = Selector::<u32>::selecting_reply(call_ref, |v| v);
            let got = process::select(&sel, Some(Duration::from_millis(100))).await;
            assert_eq!(got, Some(7));
            ExitReason::Normal
        })
        .await;
        process::wait_for_exit(pid, Duration::from_millis(200)).await;
    }
}
