//! Synchronous call/reply over a monitor-backed failure detector —
//! component C of the design.
//!
//! [`call`] mirrors OTP's `gen_server:call/3`: it monitors the callee
//! before sending, so the caller cannot hang if the callee dies between
//! send and reply, and it demonitors with `flush` on every exit path so a
//! late `ProcessDown` never pollutes the caller's mailbox afterwards. Per
//! §4.C item 5, a failed `call` terminates the *caller's* task (the
//! OTP-compatible default); [`try_call`] is the non-crashing variant.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::process::{self, ExitReason, Reply, Selector, Subject};

/// Why a [`try_call`] failed to produce a reply.
#[derive(Debug, Error)]
pub enum CallError {
    /// No reply arrived within the requested timeout.
    #[error("call timed out")]
    Timeout,
    /// The callee died with reason `noconnection` (surfaced for parity
    /// with OTP's distributed-call failure mode; in this single-host
    /// design it only occurs if an application raises it explicitly).
    #[error("callee is unreachable (nodedown)")]
    NodeDown,
    /// The callee process exited before replying.
    #[error("callee exited before replying: {0:?}")]
    Callee(ExitReason),
}

enum Outcome<R> {
    Replied(R),
    Down(ExitReason),
}

async fn call_inner<M, R>(
    subject: &Subject<M>,
    make_msg: impl FnOnce(Reply<R>) -> M,
    timeout_ms: u64,
) -> Result<R, CallError>
where
    M: Send + 'static,
    R: Send + 'static,
{
    let caller = process::current_pid().expect("call must run inside a process");
    let monitor = process::monitor_process(subject.owner_pid());

    let call_ref = process::Ref::new();
    let reply = Reply::<R>::new(caller, call_ref);
    subject.send(make_msg(reply));

    let sel = Selector::<Outcome<R>>::selecting_reply(call_ref, Outcome::Replied)
        .merge(Selector::selecting_process_down(monitor, |_pid, reason| {
            Outcome::Down(reason)
        }));

    let outcome = process::select(&sel, Some(Duration::from_millis(timeout_ms))).await;
    process::demonitor(monitor, true);

    match outcome {
        Some(Outcome::Replied(value)) => Ok(value),
        Some(Outcome::Down(reason)) => {
            if reason.abnormal_message() == Some("noconnection") {
                Err(CallError::NodeDown)
            } else {
                Err(CallError::Callee(reason))
            }
        }
        None => Err(CallError::Timeout),
    }
}

/// Sends `make_msg(reply)` to `subject` and blocks for up to `timeout_ms`
/// milliseconds for a reply. On timeout, peer death, or `nodedown`, this
/// terminates the *caller's* task with the corresponding [`ExitReason`] —
/// the OTP-compatible default (§4.C item 5). Use [`try_call`] for a
/// `Result`-returning variant.
///
/// # Panics
///
/// Panics if called outside a process spawned via [`crate::process::start`],
/// or if no reply arrives within `timeout_ms` (by design — see above).
pub async fn call<M, R>(
    subject: &Subject<M>,
    make_msg: impl FnOnce(Reply<R>) -> M,
    timeout_ms: u64,
) -> R
where
    M: Send + 'static,
    R: Send + 'static,
{
    match call_inner(subject, make_msg, timeout_ms).await {
        Ok(value) => value,
        Err(err) => panic!("call failed: {err}"),
    }
}

/// The non-crashing variant of [`call`]: failures surface as a
/// [`CallError`] instead of terminating the caller.
///
/// # Panics
///
/// Panics if called outside a process spawned via [`crate::process::start`].
pub async fn try_call<M, R>(
    subject: &Subject<M>,
    make_msg: impl FnOnce(Reply<R>) -> M,
    timeout_ms: u64,
) -> Result<R, CallError>
where
    M: Send + 'static,
    R: Send + 'static,
{
    call_inner(subject, make_msg, timeout_ms).await
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Echo {
        Ping(Reply<u32>),
        Never,
    }

    async fn echo_worker() -> Subject<Echo> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        process::start(false, move |_pid| async move {
            let sub = process::new_subject::<Echo>();
            let _ = tx.send(sub.clone());
            let sel = Selector::<Echo>::selecting(&sub, |m| m);
            match process::select_forever(&sel).await {
                Echo::Ping(reply) => reply.reply(42),
                Echo::Never => {}
            }
            ExitReason::Normal
        })
        .await;
        rx.await.unwrap()
    }

    #[tokio::test]
    async fn call_returns_the_reply_value() {
        let pid = process::start(false, |_pid| async move {
            let worker = echo_worker().await;
            let value = try_call(&worker, Echo::Ping, 200).await.unwrap();
            assert_eq!(value, 42);
            ExitReason::Normal
        })
        .await;
        process::wait_for_exit(pid, Duration::from_millis(400)).await;
    }

    #[tokio::test]
    async fn call_times_out_with_no_reply() {
        let pid = process::start(false, |_pid| async move {
            let worker = echo_worker().await;
            let err = try_call(&worker, |_reply: Reply<u32>| Echo::Never, 20)
                .await
                .unwrap_err();
            assert!(matches!(err, CallError::Timeout));
            ExitReason::Normal
        })
        .await;
        process::wait_for_exit(pid, Duration::from_millis(400)).await;
    }

    #[tokio::test]
    async fn call_fails_when_callee_exits_first() {
        let pid = process::start(false, |_pid| async move {
            let (tx, rx) = tokio::sync::oneshot::channel();
            let worker = process::start(false, move |_pid| async move {
                let sub = process::new_subject::<Echo>();
                let _ = tx.send(sub);
                ExitReason::abnormal("worker crashed before replying")
            })
            .await;
            let dangling = rx.await.unwrap();
            process::wait_for_exit(worker, Duration::from_millis(200)).await;

            let err = try_call(&dangling, Echo::Ping, 200).await.unwrap_err();
            assert!(matches!(err, CallError::Callee(_)));
            ExitReason::Normal
        })
        .await;
        process::wait_for_exit(pid, Duration::from_millis(400)).await;
    }
}
