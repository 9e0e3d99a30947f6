//! The supervisor actor: an `actor::start_spec` built on top of a
//! `{ starter, intensity, retry_channel }` state (§4.E).
//!
//! Crash handling funnels two sources into the same `handle_exit` path —
//! trapped `Exit` signals from linked children, and `RetryRestart`
//! messages the supervisor sends itself when a restart attempt fails —
//! so both interleave fairly with system messages (§4.E "Retry_channel").

// Layer 1: Standard library imports
use std::future::Future;

// Layer 2: Third-party crate imports
use chrono::Utc;
use futures::future::BoxFuture;

// Layer 3: Internal module imports
use super::config::SupervisorConfig;
use super::error::SupervisorError;
use super::intensity::IntensityTracker;
use super::starter::{Children, Starter};
use super::types::Instruction;
use crate::actor::{self, InitResult, Next};
use crate::process::{self, Exit, ExitReason, Pid, Selector, StartError, Subject};

struct SupervisorState<Arg> {
    starter: Starter<Arg>,
    intensity: IntensityTracker,
    retry_tx: Subject<Pid>,
    config: SupervisorConfig,
}

impl<Arg: Clone> Clone for SupervisorState<Arg> {
    fn clone(&self) -> Self {
        Self {
            starter: self.starter.clone(),
            intensity: self.intensity.clone(),
            retry_tx: self.retry_tx.clone(),
            config: self.config.clone(),
        }
    }
}

enum SupervisorMsg {
    Exited(Exit),
    Retry(Pid),
}

async fn handle_exit<Arg>(pid: Pid, mut state: SupervisorState<Arg>) -> Next<SupervisorState<Arg>>
where
    Arg: Clone + Send + Sync + 'static,
{
    if state.intensity.add_event(Utc::now()).is_err() {
        tracing::error!(
            max_frequency = state.config.max_frequency,
            period = ?state.config.frequency_period,
            "restart intensity exceeded, stopping supervisor"
        );
        return Next::Stop(ExitReason::Abnormal(Box::new(SupervisorError::TooManyRestarts {
            max_frequency: state.config.max_frequency,
            frequency_period: state.config.frequency_period,
        })));
    }

    match state.starter.exec(Instruction::StartFrom(pid)).await {
        Ok((starter, _instruction)) => {
            tracing::info!(?pid, "child restarted");
            state.starter = starter;
            Next::Continue(state)
        }
        Err(err) => {
            let retry_pid = err.previous_pid.unwrap_or(pid);
            tracing::debug!(?retry_pid, %err, "restart failed, scheduling async retry");
            state.retry_tx.send(retry_pid);
            Next::Continue(state)
        }
    }
}

/// A description of how to build a supervisor's initial child chain and
/// how to tune its restart intensity (§6 `supervisor.start_spec`).
pub struct Spec<Arg> {
    init: Box<dyn FnOnce(Children<()>) -> BoxFuture<'static, Children<Arg>> + Send>,
    config: SupervisorConfig,
}

impl<Arg> Spec<Arg>
where
    Arg: Clone + Send + Sync + 'static,
{
    pub fn new<Init, Fut>(init_fn: Init) -> Self
    where
        Init: FnOnce(Children<()>) -> Fut + Send + 'static,
        Fut: Future<Output = Children<Arg>> + Send + 'static,
    {
        Self {
            init: Box::new(move |seed| Box::pin(init_fn(seed))),
            config: SupervisorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SupervisorConfig) -> Self {
        self.config = config;
        self
    }
}

/// A supervisor's public handle: just its `Pid`. Nothing external sends
/// typed user messages to a supervisor — callers that need to inspect or
/// control it use [`crate::system_message`] against [`Supervisor::pid`].
#[derive(Debug, Clone, Copy)]
pub struct Supervisor {
    pid: Pid,
}

impl Supervisor {
    pub fn pid(&self) -> Pid {
        self.pid
    }
}

/// Starts a supervisor from an `init_fn` alone, using
/// [`SupervisorConfig::default`] (§6 `supervisor.start`).
pub async fn start<Arg, Init, Fut>(init_fn: Init) -> Result<Supervisor, StartError>
where
    Arg: Clone + Send + Sync + 'static,
    Init: FnOnce(Children<()>) -> Fut + Send + 'static,
    Fut: Future<Output = Children<Arg>> + Send + 'static,
{
    start_spec(Spec::new(init_fn)).await
}

/// Starts a supervisor from a full [`Spec`] (§6 `supervisor.start_spec`).
pub async fn start_spec<Arg>(spec: Spec<Arg>) -> Result<Supervisor, StartError>
where
    Arg: Clone + Send + Sync + 'static,
{
    let Spec { init, config } = spec;
    let runtime_config = actor::RuntimeConfig {
        init_timeout: config.init_timeout,
        on_unexpected: actor::ErrorAction::default(),
    };

    let actor_spec = actor::Spec::<SupervisorState<Arg>, SupervisorMsg>::new(
        move |_pid| async move {
            let exits = process::trap_exits().map(SupervisorMsg::Exited);
            let retry_tx = process::new_subject::<Pid>();
            let retry_selector = Selector::selecting(&retry_tx, SupervisorMsg::Retry);

            match (init)(Children::new(())).await {
                Children::Ready(starter) => {
                    let state = SupervisorState {
                        starter,
                        intensity: IntensityTracker::new(config.max_frequency, config.frequency_period),
                        retry_tx,
                        config: config.clone(),
                    };
                    InitResult::Ready(state, exits.merge(retry_selector))
                }
                Children::Failed(err) => InitResult::Failed(format!("child chain failed to start: {err}")),
            }
        },
        |msg: SupervisorMsg, state: SupervisorState<Arg>| async move {
            match msg {
                SupervisorMsg::Exited(exit) => handle_exit(exit.pid, state).await,
                SupervisorMsg::Retry(pid) => handle_exit(pid, state).await,
            }
        },
    )
    .with_config(runtime_config);

    let subject = actor::start_spec(actor_spec).await?;
    Ok(Supervisor {
        pid: subject.owner_pid(),
    })
}
