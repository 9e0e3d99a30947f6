//! Task-local access to the process handle of the currently executing
//! actor, used by [`crate::process::new_subject`], [`crate::process::monitor_process`],
//! and friends to know "who is asking".

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 3: Internal module imports
use super::handle::ProcessHandle;

tokio::task_local! {
    pub(crate) static CURRENT_PROCESS: Arc<ProcessHandle>;
}

/// Returns the handle of the process executing the current task.
///
/// # Panics
///
/// Panics if called outside of a task spawned via [`crate::process::start`].
/// Every call site in this crate that calls this is itself only ever
/// invoked from within a running actor or supervisor task, so this is an
/// internal invariant violation, not a user-reachable error.
pub(crate) fn current() -> Arc<ProcessHandle> {
    CURRENT_PROCESS
        .try_with(|h| h.clone())
        .expect("process primitive used outside of a running process")
}

pub(crate) fn try_current() -> Option<Arc<ProcessHandle>> {
    CURRENT_PROCESS.try_with(|h| h.clone()).ok()
}
