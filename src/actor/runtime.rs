//! The actor's run loop: mode-driven selector composition, system-message
//! dispatch, and user message delivery to the handler (§4.D "Run loop").

// Layer 3: Internal module imports
use super::spec::HandlerFn;
use super::types::{DebugState, ErrorAction, Mode, Next, RuntimeConfig};
use crate::process::{ExitReason, Pid, RawKind, Selector, Subject};
use crate::system_message::{self, StatusInfo, SystemMessage};

enum Event<S, M> {
    System(SystemMessage<S>),
    User(M),
    Unexpected(RawKind),
}

/// Runs the composed run loop until the handler (or a system `Suspend`/
/// `Resume`/`Stop`) terminates it. `pid` is this actor's own identity,
/// used for [`StatusInfo::parent`] only when no enclosing process spawned
/// it (see [`super::handshake::spawn`]).
pub(crate) async fn run<S, M>(
    parent: Pid,
    mut state: S,
    inbox: Subject<M>,
    user_selector: Selector<M>,
    handler: HandlerFn<S, M>,
    config: RuntimeConfig,
) -> ExitReason
where
    S: Clone + Send + 'static,
    M: Send + 'static,
{
    let system_selector = system_message::selector::<S>();
    let user_combined: Selector<M> = Selector::selecting(&inbox, |m| m).merge(user_selector);

    let running: Selector<Event<S, M>> = system_selector
        .clone()
        .map(Event::System)
        .merge(user_combined.map(Event::User))
        .merge(Selector::selecting_anything(Event::Unexpected));
    let suspended: Selector<Event<S, M>> = system_selector.map(Event::System);

    let mut mode = Mode::Running;
    let mut debug_state = DebugState::empty();

    loop {
        let event = match mode {
            Mode::Running => crate::process::select_forever(&running).await,
            Mode::Suspended => crate::process::select_forever(&suspended).await,
        };

        match event {
            Event::System(SystemMessage::GetState(reply)) => {
                reply.reply(state.clone());
            }
            Event::System(SystemMessage::GetStatus(reply)) => {
                reply.reply(StatusInfo {
                    module: std::any::type_name::<M>(),
                    parent,
                    mode,
                    debug_state: debug_state.clone(),
                    state: state.clone(),
                });
            }
            Event::System(SystemMessage::Suspend(reply)) => {
                tracing::debug!(mode = "suspended", "actor mode transition");
                mode = Mode::Suspended;
                reply.reply(());
            }
            Event::System(SystemMessage::Resume(reply)) => {
                tracing::debug!(mode = "running", "actor mode transition");
                mode = Mode::Running;
                reply.reply(());
            }
            Event::Unexpected(kind) => {
                tracing::warn!(?kind, "actor received a message matching no selector clause");
                if config.on_unexpected == ErrorAction::Crash {
                    return ExitReason::abnormal("unexpected message");
                }
            }
            Event::User(msg) => match (handler)(msg, state).await {
                Next::Continue(next_state) => state = next_state,
                Next::Stop(reason) => {
                    tracing::info!(reason = reason.label(), "actor stopped");
                    return reason;
                }
            },
        }
    }
}
