//! The init hand-off between a parent and a freshly spawned child actor
//! (§4.D step 3–5).
//!
//! OTP does this with a mailbox round trip (`ack_subject`) plus a monitor
//! guarding against the child dying before it acks. Here the hand-off
//! happens before the child's `Subject` has been handed to anyone, so a
//! plain `tokio::sync::oneshot` channel does the same job with less
//! machinery: its sender lives inside the child's `init()` future and is
//! wrapped in a local `catch_unwind`, so a panicking `init()` still gets a
//! chance to report `Crashed(reason)` before the task unwinds. Only a task
//! abort truly outside `init()`'s control (e.g. an external `kill` racing
//! the handshake) falls through to the bare `RecvError` path below.

// Layer 1: Standard library imports
use std::panic::AssertUnwindSafe;

// Layer 2: Third-party crate imports
use futures::FutureExt;
use tokio::sync::oneshot;

// Layer 3: Internal module imports
use super::runtime;
use super::spec::Spec;
use super::types::InitResult;
use crate::process::{self, ExitReason, StartError, Subject};

enum AckOutcome<M> {
    Ready(Subject<M>),
    Failed(String),
    Crashed(String),
}

pub(crate) async fn spawn<S, M>(spec: Spec<S, M>) -> Result<Subject<M>, StartError>
where
    S: Clone + Send + 'static,
    M: Send + 'static,
{
    let Spec {
        init,
        handler,
        config,
    } = spec;
    let init_timeout = config.init_timeout;
    let parent = process::current_pid();

    let (tx, rx) = oneshot::channel::<AckOutcome<M>>();

    let child_pid = process::start(true, move |pid| async move {
        let inbox = process::new_subject::<M>();
        match AssertUnwindSafe(init(pid)).catch_unwind().await {
            Ok(InitResult::Ready(state, user_selector)) => {
                let _ = tx.send(AckOutcome::Ready(inbox.clone()));
                runtime::run(parent.unwrap_or(pid), state, inbox, user_selector, handler, config)
                    .await
            }
            Ok(InitResult::Failed(reason)) => {
                let _ = tx.send(AckOutcome::Failed(reason.clone()));
                ExitReason::abnormal(reason)
            }
            Err(panic) => {
                let exit = ExitReason::Abnormal(panic);
                let message = exit
                    .abnormal_message()
                    .unwrap_or("panic during initialization")
                    .to_string();
                let _ = tx.send(AckOutcome::Crashed(message));
                exit
            }
        }
    })
    .await;

    match tokio::time::timeout(init_timeout, rx).await {
        Ok(Ok(AckOutcome::Ready(subject))) => Ok(subject),
        Ok(Ok(AckOutcome::Failed(reason))) => {
            Err(StartError::InitFailed(ExitReason::abnormal(reason)))
        }
        Ok(Ok(AckOutcome::Crashed(reason))) => {
            Err(StartError::InitCrashed(ExitReason::abnormal(reason)))
        }
        Ok(Err(_recv_error)) => Err(StartError::InitCrashed(ExitReason::abnormal(
            "child terminated before acknowledging initialization",
        ))),
        Err(_elapsed) => {
            process::kill(child_pid);
            Err(StartError::InitTimeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::Next;
    use super::*;

    #[tokio::test]
    async fn ready_init_returns_a_usable_subject() {
        let spec = Spec::<u32, u32>::new(
            |_pid| async move { InitResult::Ready(0, crate::process::Selector::empty()) },
            |msg: u32, state: u32| async move { Next::Continue(state + msg) },
        );
        let subject = spawn(spec).await.unwrap();
        subject.send(5);
    }

    #[tokio::test]
    async fn failed_init_reports_init_failed() {
        let spec = Spec::<u32, u32>::new(
            |_pid| async move { InitResult::<u32, u32>::Failed("bad config".to_string()) },
            |_msg: u32, state: u32| async move { Next::Continue(state) },
        );
        let err = spawn(spec).await.unwrap_err();
        assert!(matches!(err, StartError::InitFailed(_)));
    }

    #[tokio::test]
    async fn panicking_init_reports_init_crashed() {
        let spec = Spec::<u32, u32>::new(
            |_pid| async move {
                panic!("boom");
                #[allow(unreachable_code)]
                InitResult::Ready(0u32, crate::process::Selector::empty())
            },
            |_msg: u32, state: u32| async move { Next::Continue(state) },
        );
        let err = spawn(spec).await.unwrap_err();
        assert!(matches!(err, StartError::InitCrashed(_)));
    }

    #[tokio::test]
    async fn slow_init_times_out() {
        let spec = Spec::<u32, u32>::new(
            |_pid| async move {
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                InitResult::Ready(0u32, crate::process::Selector::empty())
            },
            |_msg: u32, state: u32| async move { Next::Continue(state) },
        )
        .with_config(
            crate::actor::RuntimeConfig::builder()
                .with_init_timeout(std::time::Duration::from_millis(30))
                .build()
                .unwrap(),
        );
        let err = spawn(spec).await.unwrap_err();
        assert!(matches!(err, StartError::InitTimeout));
    }
}
