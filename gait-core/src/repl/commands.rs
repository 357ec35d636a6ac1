//! High-level REPL command dispatcher.
//!
//! This module glues parsed grammar values to the plan store: `hold` and the
//! mutating `plan` subcommands are applied here and acknowledged with typed
//! summaries, while stepping and informational commands pass through as
//! structured requests for the front-end to serve (only the front-end owns
//! the stepping loop and the rendering surface). It stays `no_std` friendly
//! so every host front-end can share the same implementation.

use crate::hold::KeyHold;
use crate::plan::PlanError;

use super::grammar::{self, Command, HoldCommand, PlanCommand, StepCommand};

/// Command execution outcomes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome<'a> {
    /// A hold was offered to the plan.
    Hold(HoldAck),
    /// The plan was consolidated in place.
    Consolidate(ConsolidateAck),
    /// The plan was rewound to zero progress.
    Reset(ResetAck),
    /// The plan was discarded.
    Clear(ClearAck),
    /// Front-end request: render the authored plan.
    Show,
    /// Front-end request: drive the stepping loop.
    Step(StepCommand),
    /// Front-end request: render the status snapshot.
    Status,
    /// Front-end request: render help for an optional topic.
    Help(Option<&'a str>),
}

/// Summary returned after offering a hold to the plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoldAck {
    pub hold: KeyHold,
    /// `false` when the hold had zero duration and was skipped.
    pub queued: bool,
    /// Holds recorded in the plan after this command.
    pub plan_len: usize,
}

/// Summary returned after consolidating the plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsolidateAck {
    pub holds_before: usize,
    pub holds_after: usize,
}

/// Summary returned after rewinding the plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResetAck {
    /// Holds restored to their unexecuted state.
    pub holds: usize,
}

/// Summary returned after discarding the plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClearAck {
    /// Holds that were discarded.
    pub holds: usize,
}

/// Errors surfaced while executing a command.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandError<'a> {
    Parse(grammar::ParseError<'a>),
    Plan(PlanError),
}

impl<'a> From<grammar::ParseError<'a>> for CommandError<'a> {
    fn from(error: grammar::ParseError<'a>) -> Self {
        Self::Parse(error)
    }
}

impl<'a> From<PlanError> for CommandError<'a> {
    fn from(error: PlanError) -> Self {
        Self::Plan(error)
    }
}

/// Abstraction over the plan storage the dispatcher mutates.
pub trait PlanStore {
    /// Number of holds recorded in the plan.
    fn plan_len(&self) -> usize;

    /// Offers a hold to the plan. Returns `false` when the hold was skipped
    /// (zero duration).
    fn enqueue_hold(&mut self, hold: KeyHold) -> bool;

    /// Replaces the plan with its consolidated form, restarting execution
    /// from zero progress. Returns the hold counts before and after.
    ///
    /// # Errors
    ///
    /// [`PlanError`] when the recorded plan is degenerate.
    fn consolidate_plan(&mut self) -> Result<(usize, usize), PlanError>;

    /// Rewinds the plan to zero progress. Returns the hold count.
    fn reset_plan(&mut self) -> usize;

    /// Discards the plan. Returns the hold count that was discarded.
    fn clear_plan(&mut self) -> usize;
}

#[cfg(feature = "alloc")]
mod store_impl {
    use super::PlanStore;
    use crate::hold::KeyHold;
    use crate::plan::{self, PlanError};
    use crate::queue::CommandQueue;

    impl PlanStore for CommandQueue {
        fn plan_len(&self) -> usize {
            self.history().len()
        }

        fn enqueue_hold(&mut self, hold: KeyHold) -> bool {
            let before = self.history().len();
            self.add_hold(hold);
            self.history().len() > before
        }

        fn consolidate_plan(&mut self) -> Result<(usize, usize), PlanError> {
            let merged = plan::consolidate(self.history())?;
            let before = self.history().len();
            let after = merged.len();

            self.clear_all();
            self.add_sequence(&merged)
                .expect("consolidated plan is never empty");
            Ok((before, after))
        }

        fn reset_plan(&mut self) -> usize {
            self.reset();
            self.history().len()
        }

        fn clear_plan(&mut self) -> usize {
            let holds = self.history().len();
            self.clear_all();
            holds
        }
    }
}

/// Dispatches REPL commands into a plan store.
pub struct CommandExecutor<S> {
    store: S,
}

impl<S> CommandExecutor<S> {
    /// Creates a new executor around the provided plan store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns an immutable reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a mutable reference to the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consumes the executor and yields the inner store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S> CommandExecutor<S>
where
    S: PlanStore,
{
    /// Parses and executes a REPL command.
    ///
    /// # Errors
    ///
    /// [`CommandError::Parse`] for malformed input;
    /// [`CommandError::Plan`] when a plan mutation rejects the stored plan.
    pub fn execute<'a>(&mut self, line: &'a str) -> Result<CommandOutcome<'a>, CommandError<'a>> {
        let command = grammar::parse(line)?;
        self.dispatch(command)
    }

    fn dispatch<'a>(&mut self, command: Command<'a>) -> Result<CommandOutcome<'a>, CommandError<'a>> {
        match command {
            Command::Hold(HoldCommand { keys, steps }) => {
                let hold = KeyHold::new(keys, steps);
                let queued = self.store.enqueue_hold(hold);
                Ok(CommandOutcome::Hold(HoldAck {
                    hold,
                    queued,
                    plan_len: self.store.plan_len(),
                }))
            }
            Command::Step(request) => Ok(CommandOutcome::Step(request)),
            Command::Plan(PlanCommand::Show) => Ok(CommandOutcome::Show),
            Command::Plan(PlanCommand::Consolidate) => {
                let (holds_before, holds_after) = self.store.consolidate_plan()?;
                Ok(CommandOutcome::Consolidate(ConsolidateAck {
                    holds_before,
                    holds_after,
                }))
            }
            Command::Plan(PlanCommand::Reset) => Ok(CommandOutcome::Reset(ResetAck {
                holds: self.store.reset_plan(),
            })),
            Command::Plan(PlanCommand::Clear) => Ok(CommandOutcome::Clear(ClearAck {
                holds: self.store.clear_plan(),
            })),
            Command::Status => Ok(CommandOutcome::Status),
            Command::Help(help) => Ok(CommandOutcome::Help(help.topic)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{KeyId, KeySet};
    use heapless::Vec as HeaplessVec;

    /// Plan store that records offered holds without a real queue.
    #[derive(Default)]
    struct MockStore {
        holds: HeaplessVec<KeyHold, 8>,
        resets: usize,
    }

    impl PlanStore for MockStore {
        fn plan_len(&self) -> usize {
            self.holds.len()
        }

        fn enqueue_hold(&mut self, hold: KeyHold) -> bool {
            if hold.steps() == 0 {
                return false;
            }
            self.holds.push(hold).expect("mock store overflow");
            true
        }

        fn consolidate_plan(&mut self) -> Result<(usize, usize), PlanError> {
            if self.holds.is_empty() {
                return Err(PlanError::Empty);
            }
            let before = self.holds.len();
            Ok((before, before))
        }

        fn reset_plan(&mut self) -> usize {
            self.resets += 1;
            self.holds.len()
        }

        fn clear_plan(&mut self) -> usize {
            let holds = self.holds.len();
            self.holds.clear();
            holds
        }
    }

    #[test]
    fn hold_command_enqueues_and_acknowledges() {
        let mut executor = CommandExecutor::new(MockStore::default());

        match executor.execute("hold qw 12") {
            Ok(CommandOutcome::Hold(ack)) => {
                assert!(ack.queued);
                assert_eq!(ack.plan_len, 1);
                assert!(ack.hold.keys().is_pressed(KeyId::Q));
                assert_eq!(ack.hold.steps(), 12);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        assert_eq!(
            executor.store().holds.as_slice(),
            [KeyHold::new(
                KeySet::none().pressing(KeyId::Q).pressing(KeyId::W),
                12
            )]
        );
    }

    #[test]
    fn zero_duration_hold_reports_skipped() {
        let mut executor = CommandExecutor::new(MockStore::default());

        match executor.execute("hold none 0") {
            Ok(CommandOutcome::Hold(ack)) => {
                assert!(!ack.queued);
                assert_eq!(ack.plan_len, 0);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn step_requests_pass_through_to_the_front_end() {
        let mut executor = CommandExecutor::new(MockStore::default());
        assert_eq!(
            executor.execute("step count=5"),
            Ok(CommandOutcome::Step(StepCommand::Count(5)))
        );
        assert_eq!(
            executor.execute("step all"),
            Ok(CommandOutcome::Step(StepCommand::All))
        );
    }

    #[test]
    fn consolidate_on_an_empty_plan_surfaces_the_plan_error() {
        let mut executor = CommandExecutor::new(MockStore::default());
        assert_eq!(
            executor.execute("plan consolidate"),
            Err(CommandError::Plan(PlanError::Empty))
        );
    }

    #[test]
    fn plan_reset_and_clear_are_acknowledged() {
        let mut executor = CommandExecutor::new(MockStore::default());
        executor.execute("hold qw 3").unwrap();
        executor.execute("hold none 2").unwrap();

        assert_eq!(
            executor.execute("plan reset"),
            Ok(CommandOutcome::Reset(ResetAck { holds: 2 }))
        );
        assert_eq!(executor.store().resets, 1);

        assert_eq!(
            executor.execute("plan clear"),
            Ok(CommandOutcome::Clear(ClearAck { holds: 2 }))
        );
        assert_eq!(executor.store().plan_len(), 0);
    }

    #[test]
    fn informational_commands_pass_through() {
        let mut executor = CommandExecutor::new(MockStore::default());
        assert_eq!(executor.execute("plan show"), Ok(CommandOutcome::Show));
        assert_eq!(executor.execute("status"), Ok(CommandOutcome::Status));
        assert_eq!(
            executor.execute("help hold"),
            Ok(CommandOutcome::Help(Some("hold")))
        );
    }

    #[test]
    fn parse_failures_surface_as_command_errors() {
        let mut executor = CommandExecutor::new(MockStore::default());
        assert!(matches!(
            executor.execute("hold xz 3"),
            Err(CommandError::Parse(_))
        ));
    }
}
