//! One-shot death notification between processes.

// Layer 3: Internal module imports
use super::context;
use super::envelope::RawEnvelope;
use super::exit::ExitReason;
use super::pid::{Pid, Ref};
use super::registry;

/// A one-shot reference to observe another `Pid`. When the monitored
/// process dies, exactly one `ProcessDown` is delivered to the monitor's
/// owner — see [`crate::process::Selector::selecting_process_down`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonitorRef {
    id: Ref,
    target: Pid,
}

impl MonitorRef {
    pub(crate) fn new(id: Ref, target: Pid) -> Self {
        Self { id, target }
    }

    pub(crate) fn id(&self) -> Ref {
        self.id
    }

    pub fn target(&self) -> Pid {
        self.target
    }
}

/// Monitors `target` from the calling process. If `target` is already
/// dead, a `ProcessDown` with reason `noproc` is enqueued immediately.
pub fn monitor_process(target: Pid) -> MonitorRef {
    let watcher = context::current();
    let id = Ref::new();
    let monitor = MonitorRef::new(id, target);

    let delivered = registry::lookup(target).is_some_and(|handle| handle.add_monitor(id, watcher.pid()));

    if !delivered {
        watcher.mailbox().push(RawEnvelope::ProcessDown {
            monitor_id: id,
            pid: target,
            reason: ExitReason::abnormal("noproc"),
        });
    }

    monitor
}

/// Removes a monitor subscription. When `flush` is set, any already
/// enqueued `ProcessDown` carrying this ref is also purged from the
/// calling process's own mailbox.
pub fn demonitor(monitor: MonitorRef, flush: bool) {
    if let Some(handle) = registry::lookup(monitor.target) {
        handle.remove_monitor(monitor.id);
    }
    if flush {
        let watcher = context::current();
        watcher.mailbox().retain(|env| {
            !matches!(env, RawEnvelope::ProcessDown { monitor_id, .. } if *monitor_id == monitor.id)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{self, Selector};
    use std::time::Duration;

    #[tokio::test]
    async fn monitoring_a_dead_pid_delivers_noproc_immediately() {
        let probe = process::start(false, |_pid| async move {
            let dead = Pid::new();
            let monitor = monitor_process(dead);
            let sel = Selector::<ExitReason>::selecting_process_down(monitor, |_pid, reason| reason);
            let reason = process::select(&sel, Some(Duration::from_millis(200))).await;
            assert!(reason.is_some());
            assert_eq!(reason.unwrap().abnormal_message(), Some("noproc"));
            ExitReason::Normal
        })
        .await;
        process::wait_for_exit(probe, Duration::from_millis(200)).await;
    }

    #[tokio::test]
    async fn demonitor_with_flush_purges_enqueued_down() {
        let worker = process::start(false, |_pid| async move { ExitReason::Normal }).await;
        let probe = process::start(false, move |_pid| async move {
            let monitor = monitor_process(worker);
            process::wait_for_exit(worker, Duration::from_millis(200)).await;
            tokio::time::sleep(Duration::from_millis(20)).await;
            demonitor(monitor, true);
            let sel = Selector::<()>::selecting_process_down(monitor, |_, _| ());
            let got = process::select(&sel, Some(Duration::from_millis(50))).await;
            assert!(got.is_none(), "flushed ProcessDown must not be observed");
            ExitReason::Normal
        })
        .await;
        process::wait_for_exit(probe, Duration::from_millis(500)).await;
    }
}
