//! Actor specifications and the two entry points that bring one up:
//! [`start`] for the common "initial state + handler" case, and
//! [`start_spec`] for the full `init()`/handler/config form (§4.D,
//! §6 `actor.start`/`actor.start_spec`).

// Layer 1: Standard library imports
use std::future::Future;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use futures::future::BoxFuture;

// Layer 3: Internal module imports
use super::handshake;
use super::types::{InitResult, Next, RuntimeConfig};
use crate::process::{Pid, StartError, Subject};

pub(crate) type InitFn<S, M> = Box<dyn FnOnce(Pid) -> BoxFuture<'static, InitResult<S, M>> + Send>;
pub(crate) type HandlerFn<S, M> = Arc<dyn Fn(M, S) -> BoxFuture<'static, Next<S>> + Send + Sync>;

/// A reusable actor description: how to initialize, how to handle each
/// user message, and how long initialization may take. Unlike
/// [`crate::supervisor::ChildSpec`], a `Spec` is consumed (not replayed)
/// by a single [`start_spec`] call — it is the per-spawn description, not
/// the restart-surviving one.
pub struct Spec<S, M> {
    pub(crate) init: InitFn<S, M>,
    pub(crate) handler: HandlerFn<S, M>,
    pub(crate) config: RuntimeConfig,
}

impl<S, M> Spec<S, M>
where
    S: Clone + Send + 'static,
    M: Send + 'static,
{
    /// Builds a spec from an async `init` hand-off and a per-message async
    /// `handler`, using [`RuntimeConfig::default`].
    pub fn new<Init, InitFut, Handler, HandlerFut>(init: Init, handler: Handler) -> Self
    where
        Init: FnOnce(Pid) -> InitFut + Send + 'static,
        InitFut: Future<Output = InitResult<S, M>> + Send + 'static,
        Handler: Fn(M, S) -> HandlerFut + Send + Sync + 'static,
        HandlerFut: Future<Output = Next<S>> + Send + 'static,
    {
        Self {
            init: Box::new(move |pid| Box::pin(init(pid))),
            handler: Arc::new(move |msg, state| Box::pin(handler(msg, state))),
            config: RuntimeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }
}

/// Starts an actor with a plain initial state and handler: `init()`
/// always succeeds immediately with an empty user selector (the actor
/// only ever reacts to messages sent through its own returned `Subject`
/// and to system messages). This is the common case (§6 `actor.start`).
pub async fn start<S, M, H, Fut>(initial_state: S, handler: H) -> Subject<M>
where
    S: Clone + Send + 'static,
    M: Send + 'static,
    H: Fn(M, S) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Next<S>> + Send + 'static,
{
    let spec = Spec::new(
        move |_pid| async move { InitResult::Ready(initial_state, crate::process::Selector::empty()) },
        handler,
    );
    start_spec(spec)
        .await
        .expect("a plain Ready init hand-off cannot fail")
}

/// Starts an actor from a full [`Spec`], running the init handshake of
/// §4.D step 3–5 and, on success, returning the `Subject<M>` other
/// processes use to send it messages.
pub async fn start_spec<S, M>(spec: Spec<S, M>) -> Result<Subject<M>, StartError>
where
    S: Clone + Send + 'static,
    M: Send + 'static,
{
    handshake::spawn(spec).await
}
