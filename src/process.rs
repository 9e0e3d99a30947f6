//! Process primitives: typed subjects and selectors layered over an
//! untyped mailbox, monitors, links, and spawn/kill — component A of the
//! design. Everything above this module (`system_message`, `call`,
//! `actor`, `supervisor`) is built entirely out of the functions and types
//! exported here.

// Layer 1: Standard library imports
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use futures::FutureExt;
use thiserror::Error;

mod context;
mod envelope;
mod exit;
mod handle;
mod mailbox;
mod monitor;
mod pid;
mod registry;
mod reply;
mod selector;
mod subject;

pub(crate) use envelope::{RawEnvelope, SystemRequestTag};
pub(crate) use handle::ProcessHandle;
pub(crate) use pid::Ref;
pub(crate) use registry::lookup;

pub use exit::{Exit, ExitReason};
pub use monitor::{demonitor, monitor_process, MonitorRef};
pub use pid::Pid;
pub use reply::Reply;
pub use selector::{RawKind, Selector};
pub use subject::Subject;

use handle::ExitGuard;

/// Spawns `body` as a new process, returning its `Pid` once the task has
/// been registered (not once `body` has finished — `body` keeps running
/// concurrently).
///
/// When `linked` is set and the caller is itself running inside a process
/// (see [`current_pid`]), a bidirectional link is installed before `body`
/// starts: if either side terminates abnormally, the other is force-exited
/// with the same reason (unless it traps exits, in which case it receives
/// a typed [`Exit`] message instead — see [`trap_exits`]).
///
/// A panic inside `body` is caught and turned into `ExitReason::Abnormal`
/// carrying the panic payload, exactly as if `body` had returned that
/// reason itself — callers never see the panic unwind past `start`.
pub async fn start<F, Fut>(linked: bool, body: F) -> Pid
where
    F: FnOnce(Pid) -> Fut + Send + 'static,
    Fut: Future<Output = ExitReason> + Send + 'static,
{
    let handle = Arc::new(ProcessHandle::new());
    let pid = handle.pid();
    registry::register(pid, &handle);

    let parent = if linked { context::try_current() } else { None };
    if let Some(parent) = &parent {
        parent.add_link(pid);
        handle.add_link(parent.pid());
    }

    let task_handle = handle.clone();
    let guard_handle = handle.clone();
    let join = tokio::spawn(context::CURRENT_PROCESS.scope(task_handle, async move {
        let mut guard = ExitGuard::new(guard_handle);
        let reason = match AssertUnwindSafe(body(pid)).catch_unwind().await {
            Ok(reason) => reason,
            Err(panic) => ExitReason::Abnormal(panic),
        };
        guard.set_reason(reason);
    }));

    handle.set_abort_handle(join.abort_handle());

    pid
}

/// The `Pid` of the process executing the current task, if any.
///
/// `None` when called from plain `tokio` code that was never spawned via
/// [`start`] (e.g. a `#[tokio::test]` function body, or `main`).
pub fn current_pid() -> Option<Pid> {
    context::try_current().map(|h| h.pid())
}

/// Forces `pid` to terminate asynchronously with reason `Killed`. Not
/// trappable: `pid` dies even if it is currently trapping exits.
pub fn kill(pid: Pid) {
    if let Some(handle) = registry::lookup(pid) {
        handle.force_exit(ExitReason::Killed);
    }
}

/// Removes a bidirectional link with `pid`, if one exists. Used by the
/// supervisor (§4.E "Child shutdown") before it intentionally terminates a
/// child it is about to restart, so that termination does not loop back as
/// a typed [`Exit`] the supervisor would otherwise mistake for a fresh
/// crash — mirroring OTP's `unlink/1` immediately before `terminate_child`.
///
/// # Panics
///
/// Panics if called outside a process spawned via [`start`].
pub fn unlink(pid: Pid) {
    let current = context::current();
    current.remove_link(pid);
    if let Some(peer) = registry::lookup(pid) {
        peer.remove_link(current.pid());
    }
}

/// Sends an exit signal to `pid`. A process that traps exits receives it
/// as a typed [`Exit`] message (see [`trap_exits`]); one that does not is
/// force-terminated with `reason` directly — used by the supervisor (§4.E)
/// to shut down a child it intends to restart.
pub fn send_exit(pid: Pid, reason: ExitReason) {
    if let Some(handle) = registry::lookup(pid) {
        if handle.traps_exits() {
            let from = context::try_current().map(|h| h.pid()).unwrap_or(pid);
            handle.mailbox().push(RawEnvelope::Exit { pid: from, reason });
        } else {
            handle.force_exit(reason);
        }
    }
}

/// Enables exit trapping for the current process and returns the selector
/// clause that will deliver trapped exits as typed [`Exit`] values.
///
/// # Panics
///
/// Panics if called outside a process spawned via [`start`].
pub fn trap_exits() -> Selector<Exit> {
    context::current().set_trap_exits(true);
    Selector::trapping_exits()
}

/// Allocates a new typed inbox endpoint owned by the current process.
///
/// # Panics
///
/// Panics if called outside a process spawned via [`start`].
pub fn new_subject<M: Send + 'static>() -> Subject<M> {
    Subject::new(&context::current())
}

/// An empty selector, matching nothing. Equivalent to [`Selector::empty`];
/// provided as a free function to mirror the rest of the `process.*` API
/// surface (see §6).
pub fn new_selector<M: Send + 'static>() -> Selector<M> {
    Selector::empty()
}

/// Blocks the current process until a message matching `selector` is
/// available, or (when `timeout` is `Some`) until it elapses. A `None`
/// timeout blocks indefinitely, equivalent to [`select_forever`].
///
/// # Panics
///
/// Panics if called outside a process spawned via [`start`].
pub async fn select<M: Send + 'static>(
    selector: &Selector<M>,
    timeout: Option<Duration>,
) -> Option<M> {
    let current = context::current();
    match timeout {
        Some(duration) => current.mailbox().select(selector, duration).await,
        None => Some(current.mailbox().select_forever(selector).await),
    }
}

/// Blocks the current process indefinitely until a message matching
/// `selector` is available.
///
/// # Panics
///
/// Panics if called outside a process spawned via [`start`].
pub async fn select_forever<M: Send + 'static>(selector: &Selector<M>) -> M {
    context::current().mailbox().select_forever(selector).await
}

/// Monitors `pid` and waits (up to `timeout`) for its `ProcessDown`
/// notification, returning the reason it died with. Mainly a test and
/// example helper — application code that only cares about "did it die"
/// usually composes [`monitor_process`] into a larger selector instead.
///
/// # Panics
///
/// Panics if called outside a process spawned via [`start`].
pub async fn wait_for_exit(pid: Pid, timeout: Duration) -> Option<ExitReason> {
    let monitor = monitor_process(pid);
    let sel = Selector::<ExitReason>::selecting_process_down(monitor, |_pid, reason| reason);
    let result = select(&sel, Some(timeout)).await;
    demonitor(monitor, true);
    result
}

/// Sends the raw `(system, (caller, ref), request)` 3-tuple of §6 to
/// `pid` and returns the correlation ref the reply will carry. Used by
/// [`crate::system_message`]'s external trigger functions
/// (`get_state`/`get_status`/`suspend`/`resume`).
///
/// # Panics
///
/// Panics if called outside a process spawned via [`start`].
pub(crate) fn send_system_request(pid: Pid, request: SystemRequestTag) -> Ref {
    let caller = context::current().pid();
    let call_ref = Ref::new();
    if let Some(handle) = registry::lookup(pid) {
        handle.mailbox().push(RawEnvelope::System {
            caller,
            call_ref,
            request,
        });
    }
    call_ref
}

/// Errors surfaced by [`crate::actor::start_spec`] and
/// [`crate::supervisor::start_spec`] when a child fails to come up.
#[derive(Debug, Error)]
pub enum StartError {
    /// `init` did not acknowledge readiness within the configured timeout.
    /// The child has already been [`kill`]ed by the time this is returned.
    #[error("initialization did not acknowledge within the configured timeout")]
    InitTimeout,
    /// `init` returned `InitResult::Failed`.
    #[error("initialization reported failure: {0:?}")]
    InitFailed(ExitReason),
    /// `init` panicked, or the child process died before it could
    /// acknowledge readiness.
    #[error("initialization crashed: {0:?}")]
    InitCrashed(ExitReason),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_returns_pid_immediately() {
        let pid = start(false, |_pid| async move { ExitReason::Normal }).await;
        assert!(pid.is_alive() || wait_for_exit(pid, Duration::from_millis(100)).await.is_some());
    }

    #[tokio::test]
    async fn panic_in_body_becomes_abnormal_exit() {
        let pid = start(false, |_pid| async move {
            panic!("boom");
            #[allow(unreachable_code)]
            ExitReason::Normal
        })
        .await;
        let reason = wait_for_exit(pid, Duration::from_millis(200)).await;
        assert!(reason.is_some());
        assert_eq!(reason.unwrap().label(), "abnormal");
    }

    #[tokio::test]
    async fn send_exit_normal_terminates_non_trapping_process() {
        let pid = start(false, |_pid| async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            ExitReason::Normal
        })
        .await;
        send_exit(pid, ExitReason::Normal);
        let reason = wait_for_exit(pid, Duration::from_millis(200)).await;
        assert_eq!(reason.unwrap().label(), "normal");
    }

    #[tokio::test]
    async fn kill_terminates_even_a_trapping_process() {
        let pid = start(false, |_pid| async move {
            let sel = trap_exits();
            let _ = select(&sel, Some(Duration::from_secs(10))).await;
            ExitReason::Normal
        })
        .await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        kill(pid);
        let reason = wait_for_exit(pid, Duration::from_millis(200)).await;
        assert_eq!(reason.unwrap().label(), "killed");
    }
}
