//! Exit reasons and the trapped-exit signal.

// Layer 1: Standard library imports
use std::any::Any;
use std::fmt;

// Layer 3: Internal module imports
use super::pid::Pid;

/// Why a process terminated.
///
/// `Normal` is ignored by linked peers that are not trapping exits;
/// `Killed` and `Abnormal` propagate and, absent trap_exit, bring down
/// linked peers with the same reason.
pub enum ExitReason {
    /// Ordinary, successful completion.
    Normal,
    /// Terminated asynchronously via [`crate::process::kill`]. Not
    /// trappable: a linked peer dies even if it traps exits.
    Killed,
    /// Terminated with an application-supplied or panic-derived payload.
    Abnormal(Box<dyn Any + Send>),
}

impl ExitReason {
    /// A human-readable label, used for logging; the `Abnormal` payload
    /// itself is not required to implement `Debug` or `Display`.
    pub fn label(&self) -> &'static str {
        match self {
            ExitReason::Normal => "normal",
            ExitReason::Killed => "killed",
            ExitReason::Abnormal(_) => "abnormal",
        }
    }

    /// An `Abnormal` reason carrying a plain string, the common case for
    /// application-raised failures.
    pub fn abnormal(message: impl Into<String>) -> Self {
        ExitReason::Abnormal(Box::new(message.into()))
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, ExitReason::Normal)
    }

    /// Best-effort string rendering of an `Abnormal` payload, used by
    /// logging call sites. Returns `None` for `Normal`/`Killed`, or for an
    /// `Abnormal` payload that isn't a `String`/`&'static str`.
    pub fn abnormal_message(&self) -> Option<&str> {
        match self {
            ExitReason::Abnormal(payload) => payload
                .downcast_ref::<String>()
                .map(|s| s.as_str())
                .or_else(|| payload.downcast_ref::<&'static str>().copied()),
            _ => None,
        }
    }
}

impl fmt::Debug for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Normal => write!(f, "Normal"),
            ExitReason::Killed => write!(f, "Killed"),
            ExitReason::Abnormal(_) => {
                write!(f, "Abnormal({})", self.abnormal_message().unwrap_or(".."))
            }
        }
    }
}

/// A typed exit signal delivered via a selector clause when the receiving
/// process is trapping exits (see [`crate::process::trap_exits`]).
#[derive(Debug)]
pub struct Exit {
    pub pid: Pid,
    pub reason: ExitReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abnormal_message_roundtrips_strings() {
        let reason = ExitReason::abnormal("boom");
        assert_eq!(reason.abnormal_message(), Some("boom"));
        assert_eq!(reason.label(), "abnormal");
    }

    #[test]
    fn normal_has_no_abnormal_message() {
        assert_eq!(ExitReason::Normal.abnormal_message(), None);
        assert!(ExitReason::Normal.is_normal());
    }
}
