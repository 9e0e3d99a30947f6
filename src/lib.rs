//! # sentinel-rt — typed actor and supervision runtime
//!
//! A small BEAM-inspired runtime for building trees of isolated,
//! message-passing tasks on top of `tokio`: typed mailboxes (subjects and
//! selectors), synchronous call/reply with monitor-backed failure
//! detection, an actor state machine with an init/run/suspend/stop
//! lifecycle and a system-message control plane, and a supervisor with
//! instruction-driven restart under a rate-limited intensity policy.
//!
//! # Quick start
//!
//! ```no_run
//! use sentinel_rt::actor::{self, InitResult, Next};
//! use sentinel_rt::process::Selector;
//!
//! #[derive(Debug)]
//! enum Counter {
//!     Increment,
//!     Decrement,
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let sub = actor::start(0i64, |msg: Counter, state: i64| async move {
//!         match msg {
//!             Counter::Increment => Next::Continue(state + 1),
//!             Counter::Decrement => Next::Continue(state - 1),
//!         }
//!     })
//!     .await;
//!
//!     sub.send(Counter::Increment);
//!     let _ = Selector::<()>::empty();
//! }
//! ```
//!
//! # Module organization
//!
//! - [`process`] — Pid, Subject, Selector, monitors, links, spawn/kill
//!   (the process/mailbox primitive, component A of the design).
//! - [`system_message`] — system-message normalization (component B).
//! - [`call`] — synchronous call/reply over a monitor (component C).
//! - [`actor`] — the actor state machine: init handshake, run/suspend
//!   loop, system + user message multiplexing (component D).
//! - [`supervisor`] — child spec chains, `one-for-all` / `rest-for-one`
//!   restart via `StartFrom`, and the intensity-tracked restart governor
//!   (component E).
//!
//! # Non-goals
//!
//! Distributed consensus, persistence of actor state, hot code
//! replacement, priority scheduling, weighted fairness, and distribution
//! across hosts — failures of a remote transport are expected to surface
//! as an ordinary local [`process::ExitReason`].

pub mod actor;
pub mod call;
pub mod process;
pub mod supervisor;
pub mod system_message;

pub use actor::{ErrorAction, InitResult, Mode, Next};
pub use call::{call, try_call, CallError};
pub use process::{
    kill, monitor_process, new_selector, new_subject, send_exit, start, trap_exits, unlink, Exit,
    ExitReason, MonitorRef, Pid, Selector, StartError, Subject,
};
pub use supervisor::{ChildSpec, Instruction, IntensityTracker, Supervisor};
pub use system_message::{Reply, SystemMessage};
