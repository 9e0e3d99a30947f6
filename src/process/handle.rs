//! The process table entry backing a live `Pid`: its mailbox, monitor
//! subscriptions, links, and abort handle.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tokio::task::AbortHandle;

// Layer 3: Internal module imports
use super::envelope::RawEnvelope;
use super::exit::ExitReason;
use super::mailbox::Mailbox;
use super::pid::{Pid, Ref};
use super::registry;

pub(crate) struct MonitorSubscription {
    pub(crate) id: Ref,
    pub(crate) watcher: Pid,
}

struct MonitorState {
    alive: bool,
    subscriptions: Vec<MonitorSubscription>,
}

/// The live state behind a `Pid`. Never exposed directly — callers only
/// ever see a `Pid` (identity) or a `Subject<M>` (typed send capability).
pub(crate) struct ProcessHandle {
    pid: Pid,
    mailbox: Mailbox,
    trap_exits: AtomicBool,
    monitors: Mutex<MonitorState>,
    links: Mutex<Vec<Pid>>,
    abort: Mutex<Option<AbortHandle>>,
    pending_exit: Mutex<Option<ExitReason>>,
}

impl ProcessHandle {
    pub(crate) fn new() -> Self {
        Self {
            pid: Pid::new(),
            mailbox: Mailbox::new(),
            trap_exits: AtomicBool::new(false),
            monitors: Mutex::new(MonitorState {
                alive: true,
                subscriptions: Vec::new(),
            }),
            links: Mutex::new(Vec::new()),
            abort: Mutex::new(None),
            pending_exit: Mutex::new(None),
        }
    }

    pub(crate) fn pid(&self) -> Pid {
        self.pid
    }

    pub(crate) fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.monitors.lock().alive
    }

    pub(crate) fn set_trap_exits(&self, trap: bool) {
        self.trap_exits.store(trap, Ordering::Release);
    }

    pub(crate) fn traps_exits(&self) -> bool {
        self.trap_exits.load(Ordering::Acquire)
    }

    pub(crate) fn set_abort_handle(&self, handle: AbortHandle) {
        *self.abort.lock() = Some(handle);
    }

    /// Registers a monitor subscription, returning `false` if the process
    /// was already dead (in which case the caller must synthesize an
    /// immediate `ProcessDown { reason: noproc }` itself).
    pub(crate) fn add_monitor(&self, id: Ref, watcher: Pid) -> bool {
        let mut state = self.monitors.lock();
        if !state.alive {
            return false;
        }
        state.subscriptions.push(MonitorSubscription { id, watcher });
        true
    }

    /// Removes a monitor subscription and, if `flush` is set, purges any
    /// already-enqueued `ProcessDown` carrying the same ref from the
    /// *caller's* mailbox (handled by the caller; this only removes the
    /// subscription on the monitored side).
    pub(crate) fn remove_monitor(&self, id: Ref) {
        let mut state = self.monitors.lock();
        state.subscriptions.retain(|s| s.id != id);
    }

    pub(crate) fn add_link(&self, peer: Pid) {
        self.links.lock().push(peer);
    }

    pub(crate) fn remove_link(&self, peer: Pid) {
        self.links.lock().retain(|p| *p != peer);
    }

    /// Called on a linked peer when `peer_pid` exits. If this process
    /// traps exits, the exit is delivered as a typed message; otherwise a
    /// non-`Normal` reason cascades by force-terminating this process.
    pub(crate) fn notify_linked_exit(&self, peer_pid: Pid, reason: ExitReason) {
        self.remove_link(peer_pid);
        if self.traps_exits() {
            self.mailbox.push(RawEnvelope::Exit {
                pid: peer_pid,
                reason,
            });
            return;
        }
        if reason.is_normal() {
            return;
        }
        self.force_exit(reason);
    }

    /// Forces this process to terminate with `reason`, used by `kill` and
    /// by non-trapped link cascades. Takes effect at the task's next
    /// suspension point; the `ExitGuard` picks up `pending_exit` when it
    /// runs, whether that's via normal completion or task abort.
    pub(crate) fn force_exit(&self, reason: ExitReason) {
        *self.pending_exit.lock() = Some(reason);
        if let Some(abort) = self.abort.lock().as_ref() {
            abort.abort();
        }
    }

    fn take_pending_exit(&self) -> Option<ExitReason> {
        self.pending_exit.lock().take()
    }

    /// Marks the process dead, drains its monitor subscriptions, and
    /// notifies linked peers. Idempotent only in the sense that it must be
    /// called exactly once, from the `ExitGuard`.
    fn finalize(&self, reason_slot: &mut Option<ExitReason>) -> ExitReason {
        let reason = self
            .take_pending_exit()
            .or_else(|| reason_slot.take())
            .unwrap_or(ExitReason::Killed);

        let subs = {
            let mut state = self.monitors.lock();
            state.alive = false;
            std::mem::take(&mut state.subscriptions)
        };

        for sub in subs {
            if let Some(watcher) = registry::lookup(sub.watcher) {
                watcher.mailbox.push(RawEnvelope::ProcessDown {
                    monitor_id: sub.id,
                    pid: self.pid,
                    reason: reason.clone_for_monitor(),
                });
            }
        }

        let peers = std::mem::take(&mut *self.links.lock());
        for peer_pid in peers {
            if let Some(peer) = registry::lookup(peer_pid) {
                peer.notify_linked_exit(self.pid, reason.clone_for_monitor());
            }
        }

        registry::unregister(self.pid);
        reason
    }
}

impl ExitReason {
    /// `ExitReason` intentionally isn't `Clone` (an `Abnormal` payload may
    /// not be), but a single death fans out to N monitors and M linked
    /// peers, all of which need *a* reason. Everyone but the first
    /// recipient gets a lossy label-only reconstruction; this trades a
    /// little fidelity for not requiring every payload to be `Clone`.
    fn clone_for_monitor(&self) -> ExitReason {
        match self {
            ExitReason::Normal => ExitReason::Normal,
            ExitReason::Killed => ExitReason::Killed,
            ExitReason::Abnormal(_) => match self.abnormal_message() {
                Some(msg) => ExitReason::abnormal(msg.to_string()),
                None => ExitReason::abnormal("abnormal"),
            },
        }
    }
}

/// Ensures [`ProcessHandle::finalize`] runs exactly once per process, even
/// if the task panics or is aborted mid-flight (e.g. by [`crate::process::kill`]
/// or a non-trapped linked exit). A synchronous `Drop` still runs when a
/// `tokio` task is aborted, which is what makes this reliable without
/// cooperative cancellation.
pub(crate) struct ExitGuard {
    handle: Arc<ProcessHandle>,
    reason: Option<ExitReason>,
}

impl ExitGuard {
    pub(crate) fn new(handle: Arc<ProcessHandle>) -> Self {
        Self {
            handle,
            reason: None,
        }
    }

    pub(crate) fn set_reason(&mut self, reason: ExitReason) {
        self.reason = Some(reason);
    }
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        let reason = self.handle.finalize(&mut self.reason);
        tracing::debug!(pid = %self.handle.pid(), reason = reason.label(), "process terminated");
    }
}
