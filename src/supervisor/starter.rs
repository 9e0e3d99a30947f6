//! The child-spec chain: `Children`/`Starter`, built by repeated `add`
//! and replayed on every restart (§4.E "Child spec chain").
//!
//! `Starter<Arg>` is, per Design Notes §9, a linked list by closure
//! capture rather than an explicit `Vec<(ChildSpec, Child)>`: each
//! `add` closes over the previous `Starter` (of whatever argument type
//! it carries) inside a type-erased `exec` closure, so the only type
//! visible at the top of the chain is the *last* child's output
//! argument. `exec(instruction)` walks the chain oldest-first — first
//! recursing into the captured parent, then deciding whether *this*
//! child restarts — which is what realizes the rest-for-one traversal
//! of §4.E.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use futures::future::BoxFuture;

// Layer 3: Internal module imports
use super::error::ChildStartError;
use super::types::{ChildSpec, Instruction, ShutdownPolicy};
use crate::process::{self, ExitReason, Pid};

type ExecFn<Arg> =
    Arc<dyn Fn(Instruction) -> BoxFuture<'static, Result<(Starter<Arg>, Instruction), ChildStartError>> + Send + Sync>;

/// The current state of one link in a supervisor's child chain: the
/// composed `argument` value produced so far, the `Pid` of the child
/// this link started (`None` only for the chain's root seed), and a
/// closure capable of re-running this link (and, recursively, every
/// older link) against a restart [`Instruction`].
pub struct Starter<Arg> {
    argument: Arg,
    pid: Option<Pid>,
    exec: ExecFn<Arg>,
}

impl<Arg: Clone> Clone for Starter<Arg> {
    fn clone(&self) -> Self {
        Self {
            argument: self.argument.clone(),
            pid: self.pid,
            exec: self.exec.clone(),
        }
    }
}

impl<Arg> Starter<Arg>
where
    Arg: Clone + Send + Sync + 'static,
{
    /// The seed of a chain: no child, just the initial argument value
    /// every instruction passes through unchanged.
    pub(crate) fn root(argument: Arg) -> Self {
        let captured = argument.clone();
        let exec: ExecFn<Arg> = Arc::new(move |instruction| {
            let captured = captured.clone();
            Box::pin(async move { Ok((Starter::root(captured), instruction)) })
        });
        Starter {
            argument,
            pid: None,
            exec,
        }
    }

    /// The argument this link currently exposes to whatever child is
    /// added next.
    pub(crate) fn argument(&self) -> Arg {
        self.argument.clone()
    }

    /// The `Pid` this link started, if any (`None` only for the root).
    pub fn pid(&self) -> Option<Pid> {
        self.pid
    }

    pub(crate) async fn exec(&self, instruction: Instruction) -> Result<(Starter<Arg>, Instruction), ChildStartError> {
        (self.exec)(instruction).await
    }
}

/// Terminates a child the supervisor is about to restart.
///
/// Unlinks first: without it, force-exiting a child the supervisor is
/// still linked to loops an `Exit` notification back onto the
/// supervisor's own mailbox, which would be mistaken for a fresh crash
/// and double-count against the intensity tracker for what is actually a
/// deliberate, already-accounted-for restart (§4.E "Child shutdown").
/// The replacement child establishes its own fresh link when started.
async fn shut_down(pid: Pid, policy: ShutdownPolicy) {
    process::unlink(pid);
    match policy {
        ShutdownPolicy::BrutalKill => process::kill(pid),
        ShutdownPolicy::Infinity => process::send_exit(pid, ExitReason::Normal),
        ShutdownPolicy::Timeout(grace) => {
            process::send_exit(pid, ExitReason::Normal);
            if process::wait_for_exit(pid, grace).await.is_none() {
                process::kill(pid);
            }
        }
    }
}

fn build_node<ArgIn, ArgOut, M>(
    prev: Starter<ArgIn>,
    spec: ChildSpec<ArgIn, ArgOut, M>,
    pid: Pid,
    argument: ArgOut,
) -> Starter<ArgOut>
where
    ArgIn: Clone + Send + Sync + 'static,
    ArgOut: Clone + Send + Sync + 'static,
    M: Send + 'static,
{
    let snapshot_argument = argument.clone();
    let exec: ExecFn<ArgOut> = Arc::new(move |instruction: Instruction| {
        let prev = prev.clone();
        let spec = spec.clone();
        let snapshot_argument = snapshot_argument.clone();
        Box::pin(async move {
            let (new_parent, incoming) = prev.exec(instruction).await?;
            let should_restart = match incoming {
                Instruction::StartAll => true,
                Instruction::StartFrom(target) => target == pid,
            };
            if should_restart {
                shut_down(pid, spec.shutdown).await;
                let parent_arg = new_parent.argument();
                let new_subject = (spec.start)(parent_arg.clone())
                    .await
                    .map_err(|error| ChildStartError {
                        previous_pid: Some(pid),
                        error,
                    })?;
                let new_pid = new_subject.owner_pid();
                let new_arg = (spec.returning)(&parent_arg, &new_subject);
                Ok((
                    build_node(new_parent, spec.clone(), new_pid, new_arg),
                    Instruction::StartAll,
                ))
            } else {
                Ok((
                    build_node(new_parent, spec.clone(), pid, snapshot_argument.clone()),
                    incoming,
                ))
            }
        })
    });
    Starter { argument, pid: Some(pid), exec }
}

async fn add_child<ArgIn, ArgOut, M>(
    prev: Starter<ArgIn>,
    spec: ChildSpec<ArgIn, ArgOut, M>,
) -> Result<Starter<ArgOut>, ChildStartError>
where
    ArgIn: Clone + Send + Sync + 'static,
    ArgOut: Clone + Send + Sync + 'static,
    M: Send + 'static,
{
    let parent_arg = prev.argument();
    let subject = (spec.start)(parent_arg.clone())
        .await
        .map_err(|error| ChildStartError {
            previous_pid: None,
            error,
        })?;
    let pid = subject.owner_pid();
    let out_arg = (spec.returning)(&parent_arg, &subject);
    Ok(build_node(prev, spec, pid, out_arg))
}

/// The result of building (or restarting) a supervisor's child chain:
/// either every child so far started cleanly, or the chain is poisoned
/// and further `add` calls are a no-op (§4.E "Child spec chain").
pub enum Children<Arg> {
    Ready(Starter<Arg>),
    Failed(ChildStartError),
}

impl<Arg> Children<Arg>
where
    Arg: Clone + Send + Sync + 'static,
{
    /// The starting point for a supervisor's `init_fn`: the unit
    /// argument and no children yet (§4.E "argument=unit" default).
    pub fn new(argument: Arg) -> Self {
        Children::Ready(Starter::root(argument))
    }

    /// Starts `spec` against the chain's current argument and folds its
    /// `returning` output into the argument exposed to the *next* `add`.
    /// A no-op once the chain has already `Failed`.
    pub async fn add<ArgOut, M>(self, spec: ChildSpec<Arg, ArgOut, M>) -> Children<ArgOut>
    where
        ArgOut: Clone + Send + Sync + 'static,
        M: Send + 'static,
    {
        match self {
            Children::Failed(err) => Children::Failed(err),
            Children::Ready(starter) => match add_child(starter, spec).await {
                Ok(next) => Children::Ready(next),
                Err(err) => Children::Failed(err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Selector;

    async fn echo_child() -> Result<crate::process::Subject<u32>, crate::process::StartError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        process::start(true, move |_pid| async move {
            let sub = process::new_subject::<u32>();
            let _ = tx.send(sub.clone());
            let sel = Selector::<u32>::selecting(&sub, |m| m);
            process::select_forever(&sel).await;
            ExitReason::Normal
        })
        .await;
        Ok(rx.await.expect("child registers its subject before blocking"))
    }

    #[tokio::test]
    async fn restarting_a_middle_child_preserves_older_siblings() {
        let pid = process::start(true, |_pid| async move {
            let _exits = process::trap_exits();

            let children = Children::<()>::new(())
                .add(super::super::types::worker(|_: ()| async move {
                    echo_child().await
                }))
                .await
                .add(super::super::types::worker(|_: ()| async move {
                    echo_child().await
                }))
                .await;

            let starter = match children {
                Children::Ready(s) => s,
                Children::Failed(_) => panic!("children should start cleanly"),
            };

            let first_pid = starter.pid().unwrap();
            let (restarted, instr) = starter
                .exec(Instruction::StartFrom(first_pid))
                .await
                .unwrap();
            assert_eq!(instr, Instruction::StartAll);
            assert_ne!(restarted.pid(), Some(first_pid));
            ExitReason::Normal
        })
        .await;
        process::wait_for_exit(pid, std::time::Duration::from_millis(500)).await;
    }

    #[tokio::test]
    async fn start_all_restarts_every_child() {
        let pid = process::start(true, |_pid| async move {
            let _exits = process::trap_exits();

            let children = Children::<()>::new(())
                .add(super::super::types::worker(|_: ()| async move {
                    echo_child().await
                }))
                .await;
            let starter = match children {
                Children::Ready(s) => s,
                Children::Failed(_) => panic!("children should start cleanly"),
            };
            let before = starter.pid();
            let (restarted, instr) = starter.exec(Instruction::StartAll).await.unwrap();
            assert_eq!(instr, Instruction::StartAll);
            assert_ne!(restarted.pid(), before);
            ExitReason::Normal
        })
        .await;
        process::wait_for_exit(pid, std::time::Duration::from_millis(500)).await;
    }
}
