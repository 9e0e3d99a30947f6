//! Canonical error structs for supervisor operations (§7).

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::process::{Pid, StartError};

/// Propagates up a `Starter` chain carrying the deepest `Pid` whose
/// restart was attempted (`previous_pid`) and why the attempt failed.
/// The supervisor's `handle_exit` turns this into an asynchronous retry
/// rather than stopping outright (§4.E step 4).
#[derive(Debug, Error)]
#[error("child restart failed (previous pid {previous_pid:?}): {error}")]
pub struct ChildStartError {
    pub previous_pid: Option<Pid>,
    #[source]
    pub error: StartError,
}

/// The fatal condition a supervisor stops itself with — not a value any
/// public function returns, but the `Abnormal` payload of the
/// supervisor's own `ExitReason` (§7: "fatal supervisor conditions").
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error(
        "restart intensity exceeded: more than {max_frequency} restarts within {frequency_period:?}"
    )]
    TooManyRestarts {
        max_frequency: u32,
        frequency_period: Duration,
    },
}
