//! Process-table registry: `Pid` → process handle resolution.
//!
//! Adapted from the teacher's `ActorRegistry` (DashMap-backed, lock-free
//! address resolution) but keyed on `Pid` rather than a routing address,
//! and storing `Weak` handles so a dead process's table entry is cheap to
//! detect without an explicit unregister pass.

// Layer 1: Standard library imports
use std::sync::{Arc, LazyLock, Weak};

// Layer 2: Third-party crate imports
use dashmap::DashMap;

// Layer 3: Internal module imports
use super::handle::ProcessHandle;
use super::pid::Pid;

static TABLE: LazyLock<DashMap<Pid, Weak<ProcessHandle>>> = LazyLock::new(DashMap::new);

pub(crate) fn register(pid: Pid, handle: &Arc<ProcessHandle>) {
    TABLE.insert(pid, Arc::downgrade(handle));
}

pub(crate) fn unregister(pid: Pid) {
    TABLE.remove(&pid);
}

pub(crate) fn lookup(pid: Pid) -> Option<Arc<ProcessHandle>> {
    TABLE.get(&pid).and_then(|entry| entry.value().upgrade())
}

pub(crate) fn is_alive(pid: Pid) -> bool {
    lookup(pid).map(|h| h.is_alive()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::handle::ProcessHandle;

    #[test]
    fn lookup_misses_for_unregistered_pid() {
        let pid = Pid::new();
        assert!(lookup(pid).is_none());
        assert!(!is_alive(pid));
    }

    #[test]
    fn registered_handle_is_found_until_dropped() {
        let handle = Arc::new(ProcessHandle::new());
        let pid = handle.pid();
        register(pid, &handle);
        assert!(lookup(pid).is_some());
        drop(handle);
        assert!(lookup(pid).is_none());
        unregister(pid);
    }
}
