//! System-message normalization and dispatch — component B of the design.
//!
//! Normalizes the raw mailbox shape for system requests, a 3-tuple
//! `(system, (caller_pid, ref), request)`, into a typed [`SystemMessage`]
//! whose reply closures route back through the same reply-channel
//! substrate [`crate::call`] uses (see [`crate::process::Reply`]). For
//! `get_state`/`get_status` the reply value is forwarded verbatim; for
//! `suspend`/`resume` the reply is fixed to `()` ("ok") regardless of what
//! the actor's run loop passes, matching the OTP wire contract external
//! supervision/debugging tools expect.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 3: Internal module imports
use crate::actor::{DebugState, Mode};
use crate::process::{self, Pid, Selector, SystemRequestTag};

pub use crate::process::Reply;

/// The four out-of-band control messages an actor's run loop dispatches
/// between ordinary user messages, generic over the actor's state type so
/// that `GetState`/`GetStatus` replies carry a real, typed snapshot rather
/// than an opaque blob.
pub enum SystemMessage<S> {
    GetState(Reply<S>),
    GetStatus(Reply<StatusInfo<S>>),
    Suspend(Reply<()>),
    Resume(Reply<()>),
}

impl<S> std::fmt::Debug for SystemMessage<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SystemMessage::GetState(_) => "GetState",
            SystemMessage::GetStatus(_) => "GetStatus",
            SystemMessage::Suspend(_) => "Suspend",
            SystemMessage::Resume(_) => "Resume",
        };
        f.write_str(name)
    }
}

/// The `get_status` reply payload: `(module_atom, parent_pid, mode_atom,
/// debug_state, state_value)` per §6's wire format.
#[derive(Debug, Clone)]
pub struct StatusInfo<S> {
    pub module: &'static str,
    pub parent: Pid,
    pub mode: Mode,
    pub debug_state: DebugState,
    pub state: S,
}

/// Builds the selector clause an actor's run loop merges into its
/// composed selector (see `crate::actor::runtime`) to receive system
/// requests as typed [`SystemMessage`] values.
pub(crate) fn selector<S: Send + 'static>() -> Selector<SystemMessage<S>> {
    Selector::selecting_system(|caller, call_ref, request| match request {
        SystemRequestTag::GetState => SystemMessage::GetState(Reply::new(caller, call_ref)),
        SystemRequestTag::GetStatus => SystemMessage::GetStatus(Reply::new(caller, call_ref)),
        SystemRequestTag::Suspend => SystemMessage::Suspend(Reply::new(caller, call_ref)),
        SystemRequestTag::Resume => SystemMessage::Resume(Reply::new(caller, call_ref)),
    })
}

async fn request<R: Send + 'static>(
    pid: Pid,
    request: SystemRequestTag,
    timeout: Duration,
) -> Option<R> {
    let call_ref = process::send_system_request(pid, request);
    let sel = Selector::<R>::selecting_reply(call_ref, |v| v);
    process::select(&sel, Some(timeout)).await
}

/// `sys:get_state/1` equivalent: asks `pid` for a snapshot of its current
/// state. `None` on timeout or if `pid` never replies (e.g. it died
/// without handling the request).
///
/// # Panics
///
/// Panics if called outside a process spawned via [`crate::process::start`].
pub async fn get_state<S: Send + 'static>(pid: Pid, timeout: Duration) -> Option<S> {
    request(pid, SystemRequestTag::GetState, timeout).await
}

/// `sys:get_status/1` equivalent.
///
/// # Panics
///
/// Panics if called outside a process spawned via [`crate::process::start`].
pub async fn get_status<S: Send + 'static>(pid: Pid, timeout: Duration) -> Option<StatusInfo<S>> {
    request(pid, SystemRequestTag::GetStatus, timeout).await
}

/// `sys:suspend/1` equivalent: the actor stops dequeuing user messages
/// (they accumulate, in order, in its mailbox) until [`resume`] is called.
///
/// # Panics
///
/// Panics if called outside a process spawned via [`crate::process::start`].
pub async fn suspend(pid: Pid, timeout: Duration) -> Option<()> {
    request(pid, SystemRequestTag::Suspend, timeout).await
}

/// `sys:resume/1` equivalent.
///
/// # Panics
///
/// Panics if called outside a process spawned via [`crate::process::start`].
pub async fn resume(pid: Pid, timeout: Duration) -> Option<()> {
    request(pid, SystemRequestTag::Resume, timeout).await
}
