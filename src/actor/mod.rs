//! The actor state machine — component D of the design.
//!
//! `Initializing → Running ⇄ Suspended → Terminated`. [`start`] and
//! [`start_spec`] run the init handshake of §4.D (see
//! [`handshake::spawn`]), then hand off into the run loop (see
//! [`runtime::run`]), which multiplexes system messages (component B, via
//! [`crate::system_message`]) ahead of user messages ahead of an
//! unmatched-message catch-all, per mode.

mod handshake;
mod runtime;
mod spec;
mod types;

pub use spec::{start, start_spec, Spec};
pub use types::{
    DebugState, ErrorAction, InitResult, Mode, Next, RuntimeConfig, RuntimeConfigBuilder,
    DEFAULT_INIT_TIMEOUT,
};
