//! Child specifications and the restart-traversal instruction they are
//! driven by (§4.E).

// Layer 1: Standard library imports
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use futures::future::BoxFuture;

// Layer 3: Internal module imports
use crate::process::{Pid, StartError, Subject};

/// Drives restart traversal through a supervisor's `Starter` chain.
///
/// `StartFrom` realizes a **rest-for-one** policy: the chain is walked
/// oldest-first, so when a child matches the target, it and every
/// younger sibling restart while older siblings are left alone. Initial
/// boot, and a restart that has already begun cascading, uses `StartAll`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    StartAll,
    StartFrom(Pid),
}

/// How a supervisor asks a child to stop before restarting or tearing
/// down the tree (§9 Design Notes: a grace window is explicitly
/// permitted, not mandated, by the distilled spec).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPolicy {
    /// `kill(pid)` immediately; no chance for the child to clean up.
    BrutalKill,
    /// Send `Exit(Normal)` and wait up to the given duration before
    /// falling back to `BrutalKill`.
    Timeout(Duration),
    /// Send `Exit(Normal)` and never force-kill — the spec's default
    /// behavior (no grace window, no timeout).
    Infinity,
}

impl Default for ShutdownPolicy {
    fn default() -> Self {
        ShutdownPolicy::Infinity
    }
}

type StartFn<ArgIn, M> = Arc<dyn Fn(ArgIn) -> BoxFuture<'static, Result<Subject<M>, StartError>> + Send + Sync>;
type ReturningFn<ArgIn, ArgOut, M> = Arc<dyn Fn(&ArgIn, &Subject<M>) -> ArgOut + Send + Sync>;

/// A reusable description of how to start one supervised child and how
/// to fold its freshly started `Subject` into the argument threaded to
/// the next child in the chain. Unlike [`crate::actor::Spec`], a
/// `ChildSpec` is replayed on every restart, not consumed by a single
/// spawn.
pub struct ChildSpec<ArgIn, ArgOut, M> {
    pub(crate) start: StartFn<ArgIn, M>,
    pub(crate) returning: ReturningFn<ArgIn, ArgOut, M>,
    pub(crate) shutdown: ShutdownPolicy,
}

impl<ArgIn, ArgOut, M> Clone for ChildSpec<ArgIn, ArgOut, M> {
    fn clone(&self) -> Self {
        Self {
            start: self.start.clone(),
            returning: self.returning.clone(),
            shutdown: self.shutdown,
        }
    }
}

impl<ArgIn, ArgOut, M> ChildSpec<ArgIn, ArgOut, M>
where
    ArgIn: Send + Sync + 'static,
    ArgOut: Clone + Send + Sync + 'static,
    M: Send + 'static,
{
    /// Replaces the `returning` step, changing the argument type handed
    /// to the next child in the chain.
    pub fn returning<ArgOut2>(
        self,
        updater: impl Fn(&ArgIn, &Subject<M>) -> ArgOut2 + Send + Sync + 'static,
    ) -> ChildSpec<ArgIn, ArgOut2, M>
    where
        ArgOut2: Clone + Send + Sync + 'static,
    {
        ChildSpec {
            start: self.start,
            returning: Arc::new(updater),
            shutdown: self.shutdown,
        }
    }

    /// Overrides the default [`ShutdownPolicy::Infinity`] for this child.
    pub fn with_shutdown(mut self, policy: ShutdownPolicy) -> Self {
        self.shutdown = policy;
        self
    }
}

/// Builds a [`ChildSpec`] that threads its argument through unchanged —
/// the common case (§6 `supervisor.worker`). Use [`ChildSpec::returning`]
/// when a later child needs something derived from this one.
pub fn worker<ArgIn, M, F, Fut>(start_fn: F) -> ChildSpec<ArgIn, ArgIn, M>
where
    ArgIn: Clone + Send + Sync + 'static,
    M: Send + 'static,
    F: Fn(ArgIn) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Subject<M>, StartError>> + Send + 'static,
{
    ChildSpec {
        start: Arc::new(move |arg| Box::pin(start_fn(arg))),
        returning: Arc::new(|arg, _subject| arg.clone()),
        shutdown: ShutdownPolicy::default(),
    }
}
