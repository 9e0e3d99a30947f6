//! Integration coverage for the actor init handshake and run-loop modes
//! (§8 concrete scenarios 1, 2, 5).

use sentinel_rt::actor::{self, InitResult, Next};
use sentinel_rt::process::{self, ExitReason, Selector};
use sentinel_rt::{try_call, Reply, StartError};
use std::time::Duration;

enum Echo {
    Ping(i64, Reply<i64>),
}

#[tokio::test]
async fn echo_actor_replies_with_the_value_it_was_sent() {
    let pid = process::start(false, |_pid| async move {
        let sub = actor::start((), |msg: Echo, state: ()| async move {
            match msg {
                Echo::Ping(x, reply) => reply.reply(x),
            }
            Next::Continue(state)
        })
        .await;

        let value = try_call(&sub, |reply| Echo::Ping(42, reply), 100).await.unwrap();
        assert_eq!(value, 42);
        ExitReason::Normal
    })
    .await;
    process::wait_for_exit(pid, Duration::from_millis(300)).await;
}

#[tokio::test]
async fn suspend_then_resume_delivers_the_queued_message() {
    use sentinel_rt::system_message;

    enum Counted {
        Mark,
    }

    let pid = process::start(false, |_pid| async move {
        let (seen_tx, mut seen_rx) = tokio::sync::mpsc::unbounded_channel();
        let spec = actor::Spec::<(), Counted>::new(
            |_pid| async move { InitResult::Ready((), Selector::empty()) },
            move |_msg: Counted, _state: ()| {
                let seen_tx = seen_tx.clone();
                async move {
                    let _ = seen_tx.send(());
                    Next::Continue(())
                }
            },
        );
        let sub = actor::start_spec(spec).await.unwrap();

        system_message::suspend(sub.owner_pid(), Duration::from_millis(200))
            .await
            .unwrap();
        sub.send(Counted::Mark);

        let not_yet = tokio::time::timeout(Duration::from_millis(50), seen_rx.recv()).await;
        assert!(not_yet.is_err(), "a suspended actor must not run its handler");

        system_message::resume(sub.owner_pid(), Duration::from_millis(200))
            .await
            .unwrap();
        let delivered = tokio::time::timeout(Duration::from_millis(100), seen_rx.recv()).await;
        assert!(delivered.is_ok(), "resuming must deliver the queued message");
        ExitReason::Normal
    })
    .await;
    process::wait_for_exit(pid, Duration::from_millis(500)).await;
}

#[tokio::test]
async fn panicking_init_reports_init_crashed_not_init_failed() {
    let pid = process::start(false, |_pid| async move {
        let spec = actor::Spec::<(), ()>::new(
            |_pid| async move {
                panic!("init exploded");
                #[allow(unreachable_code)]
                InitResult::<(), ()>::Ready((), Selector::empty())
            },
            |_msg: (), state: ()| async move { Next::Continue(state) },
        );
        let err = actor::start_spec(spec).await.unwrap_err();
        assert!(matches!(err, StartError::InitCrashed(_)));
        ExitReason::Normal
    })
    .await;
    process::wait_for_exit(pid, Duration::from_millis(300)).await;
}

#[tokio::test]
async fn failed_init_reports_init_failed_not_init_crashed() {
    let pid = process::start(false, |_pid| async move {
        let spec = actor::Spec::<(), ()>::new(
            |_pid| async move { InitResult::<(), ()>::Failed("bad configuration".to_string()) },
            |_msg: (), state: ()| async move { Next::Continue(state) },
        );
        let err = actor::start_spec(spec).await.unwrap_err();
        assert!(matches!(err, StartError::InitFailed(_)));
        ExitReason::Normal
    })
    .await;
    process::wait_for_exit(pid, Duration::from_millis(300)).await;
}
