//! The untyped mailbox message shape.
//!
//! Every [`crate::process::Subject`] send, monitor notification, trapped
//! exit, and system-message request ultimately lands in a process's
//! mailbox as one of these variants. [`crate::process::Selector`] clauses
//! match against `RawEnvelope` values; nothing outside `process` and
//! `system_message` needs to see this type.

// Layer 1: Standard library imports
use std::any::Any;

// Layer 3: Internal module imports
use super::exit::ExitReason;
use super::pid::{Pid, Ref};

/// The four system-message request kinds, in their raw (closure-less)
/// form. [`crate::system_message::normalize`] turns one of these, plus the
/// `(caller, call_ref)` pair it travels with, into a typed
/// [`crate::system_message::SystemMessage`] carrying a one-shot
/// [`crate::system_message::Reply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemRequestTag {
    GetState,
    GetStatus,
    Suspend,
    Resume,
}

/// A raw mailbox entry, as stored in a process's queue before any selector
/// has matched it into a typed value.
pub enum RawEnvelope {
    /// A value sent through a [`crate::process::Subject`].
    Subject {
        subject_id: u64,
        payload: Box<dyn Any + Send>,
    },
    /// Delivered once, when a monitored `Pid` dies.
    ProcessDown {
        monitor_id: Ref,
        pid: Pid,
        reason: ExitReason,
    },
    /// Delivered to a trapping process when a linked peer exits.
    Exit { pid: Pid, reason: ExitReason },
    /// The raw 3-tuple `(system, (caller, ref), request)` of §6.
    System {
        caller: Pid,
        call_ref: Ref,
        request: SystemRequestTag,
    },
    /// Generic tagged 3-tuple, for OTP-style interop beyond the four
    /// built-in system requests. Matched via
    /// [`crate::process::Selector::selecting_record3`].
    Record3 {
        tag: &'static str,
        payload: Box<dyn Any + Send>,
    },
    /// A one-shot reply addressed by correlation ref, delivered by
    /// [`super::reply::Reply::reply`] and matched via
    /// [`crate::process::Selector::selecting_reply`]. Backs both the
    /// synchronous call protocol (component C) and system-message replies
    /// (component B) — see `src/process/reply.rs`.
    Reply {
        call_ref: Ref,
        payload: Box<dyn Any + Send>,
    },
}
