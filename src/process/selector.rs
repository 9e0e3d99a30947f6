//! Composable selectors: the typed view onto an untyped mailbox.

// Layer 1: Standard library imports
use std::any::Any;
use std::sync::Arc;

// Layer 3: Internal module imports
use super::envelope::{RawEnvelope, SystemRequestTag};
use super::exit::{Exit, ExitReason};
use super::monitor::MonitorRef;
use super::pid::{Pid, Ref};
use super::subject::Subject;

type MatchFn = Arc<dyn Fn(&RawEnvelope) -> bool + Send + Sync>;
type ExtractFn<M> = Arc<dyn Fn(RawEnvelope) -> M + Send + Sync>;

struct Clause<M> {
    matches: MatchFn,
    extract: ExtractFn<M>,
}

impl<M> Clone for Clause<M> {
    fn clone(&self) -> Self {
        Self {
            matches: self.matches.clone(),
            extract: self.extract.clone(),
        }
    }
}

/// A description of which raw mailbox messages map to typed values of
/// `M`, and how. Selectors are values, not state: building one does not
/// touch any mailbox, and the same selector can be reused across many
/// `select` calls.
///
/// Composition order is significant. When a single mailbox message
/// matches clauses from more than one composed selector, the clause added
/// **earliest** wins (see [`Selector::merge`]).
pub struct Selector<M> {
    clauses: Vec<Clause<M>>,
}

impl<M> Clone for Selector<M> {
    fn clone(&self) -> Self {
        Self {
            clauses: self.clauses.clone(),
        }
    }
}

impl<M: Send + 'static> Selector<M> {
    /// A selector matching nothing.
    pub fn empty() -> Self {
        Self {
            clauses: Vec::new(),
        }
    }

    /// Matches values sent through `subject`, converting each with `tag`.
    pub fn selecting<X: Send + 'static>(
        subject: &Subject<X>,
        tag: impl Fn(X) -> M + Send + Sync + 'static,
    ) -> Self {
        let subject_id = subject.id();
        let matches: MatchFn = Arc::new(move |env| {
            matches!(
                env,
                RawEnvelope::Subject { subject_id: sid, payload }
                    if *sid == subject_id && payload.is::<X>()
            )
        });
        let extract: ExtractFn<M> = Arc::new(move |env| match env {
            RawEnvelope::Subject { payload, .. } => match payload.downcast::<X>() {
                Ok(boxed) => tag(*boxed),
                Err(_) => unreachable!("selector matched a subject clause it cannot extract"),
            },
            _ => unreachable!("selector extract called on a non-matching envelope"),
        });
        Self {
            clauses: vec![Clause { matches, extract }],
        }
    }

    /// A catch-all clause: matches any raw mailbox message not already
    /// claimed by an earlier clause in the final composed selector.
    pub fn selecting_anything(tag: impl Fn(RawKind) -> M + Send + Sync + 'static) -> Self {
        let matches: MatchFn = Arc::new(|_| true);
        let extract: ExtractFn<M> = Arc::new(move |env| tag(RawKind::of(&env)));
        Self {
            clauses: vec![Clause { matches, extract }],
        }
    }

    /// Matches the one `ProcessDown` delivered for `monitor`.
    pub fn selecting_process_down(
        monitor: MonitorRef,
        tag: impl Fn(Pid, ExitReason) -> M + Send + Sync + 'static,
    ) -> Self {
        let id = monitor.id();
        let matches: MatchFn = Arc::new(move |env| {
            matches!(env, RawEnvelope::ProcessDown { monitor_id, .. } if *monitor_id == id)
        });
        let extract: ExtractFn<M> = Arc::new(move |env| match env {
            RawEnvelope::ProcessDown { pid, reason, .. } => tag(pid, reason),
            _ => unreachable!("selector extract called on a non-matching envelope"),
        });
        Self {
            clauses: vec![Clause { matches, extract }],
        }
    }

    /// Matches a generic tagged 3-tuple, for OTP-style interop beyond the
    /// built-in system-message protocol.
    pub fn selecting_record3<T: Send + 'static>(
        tag_name: &'static str,
        decoder: impl Fn(T) -> M + Send + Sync + 'static,
    ) -> Self {
        let matches: MatchFn = Arc::new(move |env| {
            matches!(
                env,
                RawEnvelope::Record3 { tag, payload } if *tag == tag_name && payload.is::<T>()
            )
        });
        let extract: ExtractFn<M> = Arc::new(move |env| match env {
            RawEnvelope::Record3 { payload, .. } => match payload.downcast::<T>() {
                Ok(boxed) => decoder(*boxed),
                Err(_) => unreachable!("selector matched a record3 clause it cannot extract"),
            },
            _ => unreachable!("selector extract called on a non-matching envelope"),
        });
        Self {
            clauses: vec![Clause { matches, extract }],
        }
    }

    /// Matches the raw `(system, (caller, ref), request)` 3-tuple of §6,
    /// used by [`crate::system_message::normalize`] to build the typed
    /// system-message selector clause (component B).
    pub fn selecting_system(
        tag: impl Fn(Pid, Ref, SystemRequestTag) -> M + Send + Sync + 'static,
    ) -> Self {
        let matches: MatchFn = Arc::new(|env| matches!(env, RawEnvelope::System { .. }));
        let extract: ExtractFn<M> = Arc::new(move |env| match env {
            RawEnvelope::System {
                caller,
                call_ref,
                request,
            } => tag(caller, call_ref, request),
            _ => unreachable!("selector extract called on a non-matching envelope"),
        });
        Self {
            clauses: vec![Clause { matches, extract }],
        }
    }

    /// Matches the one-shot reply addressed by `call_ref`, used by the
    /// synchronous call protocol (component C) and by system-message
    /// callers (component B) — see [`super::reply::Reply`].
    pub fn selecting_reply<R: Send + 'static>(
        call_ref: Ref,
        tag: impl Fn(R) -> M + Send + Sync + 'static,
    ) -> Self {
        let matches: MatchFn = Arc::new(move |env| {
            matches!(
                env,
                RawEnvelope::Reply { call_ref: id, payload } if *id == call_ref && payload.is::<R>()
            )
        });
        let extract: ExtractFn<M> = Arc::new(move |env| match env {
            RawEnvelope::Reply { payload, .. } => match payload.downcast::<R>() {
                Ok(boxed) => tag(*boxed),
                Err(_) => unreachable!("selector matched a reply clause it cannot extract"),
            },
            _ => unreachable!("selector extract called on a non-matching envelope"),
        });
        Self {
            clauses: vec![Clause { matches, extract }],
        }
    }

    /// Composes two selectors. Clauses already present in `self` take
    /// precedence over `other`'s when a single message matches both.
    pub fn merge(mut self, other: Selector<M>) -> Self {
        self.clauses.extend(other.clauses);
        self
    }

    /// Transforms the typed values this selector produces, without
    /// changing which raw messages it matches.
    pub fn map<N: Send + 'static>(self, f: impl Fn(M) -> N + Send + Sync + 'static) -> Selector<N>
    where
        M: 'static,
    {
        let f = Arc::new(f);
        Selector {
            clauses: self
                .clauses
                .into_iter()
                .map(|clause| {
                    let Clause { matches, extract } = clause;
                    let f = f.clone();
                    let extract: ExtractFn<N> = Arc::new(move |env| f(extract(env)));
                    Clause { matches, extract }
                })
                .collect(),
        }
    }

    pub(crate) fn matches(&self, env: &RawEnvelope) -> bool {
        self.clauses.iter().any(|c| (c.matches)(env))
    }

    /// Invokes the first clause (in composition order) that matches
    /// `env`. Panics if called without first confirming a match via
    /// [`Selector::matches`] — only the mailbox loop calls this.
    pub(crate) fn extract(&self, env: RawEnvelope) -> M {
        for clause in &self.clauses {
            if (clause.matches)(&env) {
                return (clause.extract)(env);
            }
        }
        unreachable!("extract called without a prior matching clause")
    }
}

impl<M: Send + 'static> Default for Selector<M> {
    fn default() -> Self {
        Self::empty()
    }
}

impl Selector<Exit> {
    /// Builds the single clause matching a trapped linked-peer exit.
    /// Only [`crate::process::trap_exits`] constructs one of these.
    pub(crate) fn trapping_exits() -> Self {
        let matches: MatchFn = Arc::new(|env| matches!(env, RawEnvelope::Exit { .. }));
        let extract: ExtractFn<Exit> = Arc::new(|env| match env {
            RawEnvelope::Exit { pid, reason } => Exit { pid, reason },
            _ => unreachable!("selector extract called on a non-matching envelope"),
        });
        Self {
            clauses: vec![Clause { matches, extract }],
        }
    }
}

/// A coarse, inspectable view of an unmatched raw mailbox message, handed
/// to [`Selector::selecting_anything`] clauses in place of the fully typed
/// (and otherwise type-erased) payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKind {
    Subject,
    ProcessDown,
    Exit,
    System,
    Record3,
    Reply,
}

impl RawKind {
    fn of(env: &RawEnvelope) -> Self {
        match env {
            RawEnvelope::Subject { .. } => RawKind::Subject,
            RawEnvelope::ProcessDown { .. } => RawKind::ProcessDown,
            RawEnvelope::Exit { .. } => RawKind::Exit,
            RawEnvelope::System { .. } => RawKind::System,
            RawEnvelope::Record3 { .. } => RawKind::Record3,
            RawEnvelope::Reply { .. } => RawKind::Reply,
        }
    }
}
