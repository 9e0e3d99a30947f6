//! Plain data types of the actor state machine: modes, debug state,
//! the handler's continuation value, the init handshake's result, the
//! unexpected-message policy, and runtime tuning (§3, §9).

// Layer 1: Standard library imports
use std::collections::BTreeMap;
use std::time::Duration;

// Layer 3: Internal module imports
use crate::process::ExitReason;

/// Default timeout an `init()` hand-off is given to acknowledge readiness
/// before the parent kills the child and reports [`crate::process::StartError::InitTimeout`].
pub const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Whether the run loop is dequeuing user messages.
///
/// `Suspended` actors still answer system messages (`get_state`,
/// `get_status`, `resume`); user messages simply accumulate, in order, in
/// the mailbox until [`Mode::Running`] resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Running,
    Suspended,
}

/// Opaque carrier for OTP-style debug options. An empty value is valid
/// and is what every actor starts with; labels are a convenience for
/// attaching free-form diagnostic notes visible through `get_status`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugState {
    labels: BTreeMap<String, String>,
}

impl DebugState {
    /// An empty debug state — the default for every actor.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attaches a free-form `key`/`value` diagnostic label, returned
    /// verbatim by `get_status`.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// The handler's verdict after processing one message: keep running with
/// an updated state, or terminate with a given reason.
pub enum Next<S> {
    Continue(S),
    Stop(ExitReason),
}

/// The outcome of an actor's `init()` hand-off (§4.D step 3).
pub enum InitResult<S, M> {
    /// Ready to run, with the initial state and a selector for any
    /// additional mailbox patterns the actor wants beyond its own
    /// `Subject<M>` (an empty selector is the common case).
    Ready(S, crate::process::Selector<M>),
    /// Initialization failed; the child reports this to its parent and
    /// terminates with `Abnormal(reason)`.
    Failed(String),
}

/// Policy for the run loop's `selecting_anything` catch-all clause (§4.D,
/// §9 Open Questions: the source's actor loop in one revision crashes on
/// `Unexpected`, in another only logs — spec mandates log + continue but
/// permits exposing the choice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorAction {
    /// Log the unmatched message and keep running (the spec's default).
    #[default]
    LogAndContinue,
    /// Terminate the actor with `Abnormal("unexpected message")`.
    Crash,
}

/// Tunables for the actor state machine: how long `init()` gets to
/// acknowledge readiness, and what to do about mailbox messages that
/// match no clause of the composed selector. Mirrors the teacher's
/// `SystemConfig` builder shape (defaults + fluent builder + `validate`).
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub init_timeout: Duration,
    pub on_unexpected: ErrorAction,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            init_timeout: DEFAULT_INIT_TIMEOUT,
            on_unexpected: ErrorAction::LogAndContinue,
        }
    }
}

impl RuntimeConfig {
    pub fn builder() -> RuntimeConfigBuilder {
        RuntimeConfigBuilder::default()
    }

    /// Rejects a zero init timeout, which would make every spawn time out
    /// immediately.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_timeout.is_zero() {
            return Err("init_timeout must be > 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RuntimeConfigBuilder {
    config: RuntimeConfig,
}

impl RuntimeConfigBuilder {
    pub fn with_init_timeout(mut self, timeout: Duration) -> Self {
        self.config.init_timeout = timeout;
        self
    }

    pub fn with_on_unexpected(mut self, action: ErrorAction) -> Self {
        self.config.on_unexpected = action;
        self
    }

    pub fn build(self) -> Result<RuntimeConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}
